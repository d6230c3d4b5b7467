use std::fmt;

use super::bkpt::BkptBus;
use super::flag::{FlagName, Flags};

/// The 4-bit condition field gating every instruction, in encoding order.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Condition {
    EQ,
    NE,
    CS,
    CC,
    MI,
    PL,
    VS,
    VC,
    HI,
    LS,
    GE,
    LT,
    GT,
    LE,
    AL,
    NV,
}

impl Condition {
    pub fn from_bits(bits: u8) -> Condition {
        match bits & 0xF {
            0b0000 => Condition::EQ,
            0b0001 => Condition::NE,
            0b0010 => Condition::CS,
            0b0011 => Condition::CC,
            0b0100 => Condition::MI,
            0b0101 => Condition::PL,
            0b0110 => Condition::VS,
            0b0111 => Condition::VC,
            0b1000 => Condition::HI,
            0b1001 => Condition::LS,
            0b1010 => Condition::GE,
            0b1011 => Condition::LT,
            0b1100 => Condition::GT,
            0b1101 => Condition::LE,
            0b1110 => Condition::AL,
            _ => Condition::NV,
        }
    }

    /// Whether the condition holds under the current flags.
    ///
    /// Flag reads go through the watchpoint-signalling getters, so a flag
    /// read breakpoint can fire from the condition check alone.
    pub fn holds(self, flags: &Flags, bkpt: &mut BkptBus) -> bool {
        use FlagName::{C, N, V, Z};

        match self {
            Condition::EQ => flags.get(Z, bkpt, true),
            Condition::NE => !flags.get(Z, bkpt, true),
            Condition::CS => flags.get(C, bkpt, true),
            Condition::CC => !flags.get(C, bkpt, true),
            Condition::MI => flags.get(N, bkpt, true),
            Condition::PL => !flags.get(N, bkpt, true),
            Condition::VS => flags.get(V, bkpt, true),
            Condition::VC => !flags.get(V, bkpt, true),
            Condition::HI => flags.get(C, bkpt, true) && !flags.get(Z, bkpt, true),
            Condition::LS => !flags.get(C, bkpt, true) || flags.get(Z, bkpt, true),
            Condition::GE => flags.get(N, bkpt, true) == flags.get(V, bkpt, true),
            Condition::LT => flags.get(N, bkpt, true) != flags.get(V, bkpt, true),
            Condition::GT => {
                !flags.get(Z, bkpt, true) && flags.get(N, bkpt, true) == flags.get(V, bkpt, true)
            }
            Condition::LE => {
                flags.get(Z, bkpt, true) || flags.get(N, bkpt, true) != flags.get(V, bkpt, true)
            }
            Condition::AL => true,
            Condition::NV => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
