use std::fmt;

use super::bkpt::{BkptBus, BkptEvent, BkptSource, MODE_READ, MODE_WRITE};

/// The four condition flags of the processor status.
///
/// - `Z` is set when the result of a flag-setting operation is zero.
/// - `N` is bit 31 of the result, i.e. the result interpreted as negative.
/// - `C` is the carry out of the adder or the barrel shifter.
/// - `V` is set on signed arithmetic overflow.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FlagName {
    Z,
    N,
    C,
    V,
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single condition flag with the same watchpoint contract as a register:
/// bit 4 of `breakpoint` signals reads, bit 2 signals writes.
#[derive(Debug)]
pub struct Flag {
    pub name: FlagName,
    val: bool,
    pub breakpoint: u8,
}

impl Flag {
    pub fn new(name: FlagName) -> Flag {
        Flag {
            name,
            val: false,
            breakpoint: 0,
        }
    }

    pub fn get(&self, bkpt: &mut BkptBus, may_signal: bool) -> bool {
        if may_signal && self.breakpoint & MODE_READ != 0 {
            bkpt.throw(BkptEvent {
                source: BkptSource::Flag(self.name),
                mode: MODE_READ,
            });
        }
        self.val
    }

    pub fn set(&mut self, val: bool, bkpt: &mut BkptBus, may_signal: bool) {
        if may_signal && self.breakpoint & MODE_WRITE != 0 {
            bkpt.throw(BkptEvent {
                source: BkptSource::Flag(self.name),
                mode: MODE_WRITE,
            });
        }
        self.val = val;
    }

    /// Current value without going through the watchpoint check. Inspection
    /// only; executing code reads through `get`.
    pub fn value(&self) -> bool {
        self.val
    }
}

impl PartialEq<bool> for Flag {
    fn eq(&self, other: &bool) -> bool {
        self.val == *other
    }
}

/// The flag set. Flags are always addressed by name, never by index.
#[derive(Debug)]
pub struct Flags {
    z: Flag,
    n: Flag,
    c: Flag,
    v: Flag,
}

impl Flags {
    pub fn new() -> Flags {
        Flags {
            z: Flag::new(FlagName::Z),
            n: Flag::new(FlagName::N),
            c: Flag::new(FlagName::C),
            v: Flag::new(FlagName::V),
        }
    }

    pub fn flag(&self, name: FlagName) -> &Flag {
        match name {
            FlagName::Z => &self.z,
            FlagName::N => &self.n,
            FlagName::C => &self.c,
            FlagName::V => &self.v,
        }
    }

    pub fn flag_mut(&mut self, name: FlagName) -> &mut Flag {
        match name {
            FlagName::Z => &mut self.z,
            FlagName::N => &mut self.n,
            FlagName::C => &mut self.c,
            FlagName::V => &mut self.v,
        }
    }

    pub fn get(&self, name: FlagName, bkpt: &mut BkptBus, may_signal: bool) -> bool {
        self.flag(name).get(bkpt, may_signal)
    }

    pub fn set(&mut self, name: FlagName, val: bool, bkpt: &mut BkptBus, may_signal: bool) {
        self.flag_mut(name).set(val, bkpt, may_signal)
    }
}
