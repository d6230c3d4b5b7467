use std::ops::{Index, IndexMut};

use super::bkpt::{BkptBus, BkptEvent, BkptSource, MODE_READ, MODE_WRITE};

pub const SP: usize = 13;
pub const LR: usize = 14;
pub const PC: usize = 15;

/// One of the sixteen general registers.
///
/// The stored value is a `u32`, so the architectural truncate-to-32-bits on
/// write holds by construction. Every write is appended to `history`, which
/// the surrounding UI uses for time-travel inspection; the log is
/// chronological within this register and unbounded.
#[derive(Debug)]
pub struct Register {
    pub id: usize,
    val: u32,

    /// Presentation alias (`SP`, `LR`, `PC`). Does not alter semantics.
    pub altname: Option<&'static str>,

    pub history: Vec<u32>,

    /// Watchpoint mask: bit 4 signals reads, bit 2 signals writes.
    pub breakpoint: u8,
}

impl Register {
    fn new(id: usize, altname: Option<&'static str>) -> Register {
        Register {
            id,
            val: 0,
            altname,
            history: Vec::new(),
            breakpoint: 0,
        }
    }

    pub fn name(&self) -> String {
        format!("R{}", self.id)
    }

    pub fn get(&self, bkpt: &mut BkptBus, may_signal: bool) -> u32 {
        if may_signal && self.breakpoint & MODE_READ != 0 {
            bkpt.throw(BkptEvent {
                source: BkptSource::Register(self.id),
                mode: MODE_READ,
            });
        }
        self.val
    }

    pub fn set(&mut self, val: u32, bkpt: &mut BkptBus, may_signal: bool) {
        if may_signal && self.breakpoint & MODE_WRITE != 0 {
            bkpt.throw(BkptEvent {
                source: BkptSource::Register(self.id),
                mode: MODE_WRITE,
            });
        }
        self.history.push(val);
        self.val = val;
    }

    /// Current value without going through the watchpoint check. Inspection
    /// only; executing code reads through `get`.
    pub fn value(&self) -> u32 {
        self.val
    }
}

/// The register file: exactly sixteen registers, R13..R15 carrying the
/// conventional aliases.
#[derive(Debug)]
pub struct RegisterFile {
    regs: [Register; 16],
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        let regs = std::array::from_fn(|id| {
            let altname = match id {
                SP => Some("SP"),
                LR => Some("LR"),
                PC => Some("PC"),
                _ => None,
            };
            Register::new(id, altname)
        });

        RegisterFile { regs }
    }

    pub fn get(&self, id: usize, bkpt: &mut BkptBus, may_signal: bool) -> u32 {
        self.regs[id].get(bkpt, may_signal)
    }

    pub fn set(&mut self, id: usize, val: u32, bkpt: &mut BkptBus, may_signal: bool) {
        self.regs[id].set(val, bkpt, may_signal)
    }
}

impl Index<usize> for RegisterFile {
    type Output = Register;

    fn index(&self, id: usize) -> &Register {
        &self.regs[id]
    }
}

impl IndexMut<usize> for RegisterFile {
    fn index_mut(&mut self, id: usize) -> &mut Register {
        &mut self.regs[id]
    }
}
