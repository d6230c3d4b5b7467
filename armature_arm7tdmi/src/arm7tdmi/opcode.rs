/// The sixteen data-processing opcodes, in encoding order (bits 24..21 of
/// the instruction word).
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum DataOpcode {
    /// Bitwise AND: `Rd = Rn & op2`
    AND,

    /// Bitwise exclusive OR: `Rd = Rn ^ op2`
    EOR,

    /// Subtract: `Rd = Rn - op2`
    SUB,

    /// Reverse subtract: `Rd = op2 - Rn`
    RSB,

    /// Add: `Rd = Rn + op2`
    ADD,

    /// Add with carry: `Rd = Rn + op2 + C`
    ADC,

    /// Subtract with carry: `Rd = Rn - op2 + C - 1`
    SBC,

    /// Reverse subtract with carry: `Rd = op2 - Rn + C - 1`
    RSC,

    /// Test: AND that only updates the flags
    TST,

    /// Test equivalence: EOR that only updates the flags
    TEQ,

    /// Compare: SUB that only updates the flags
    CMP,

    /// Compare negative: ADD that only updates the flags
    CMN,

    /// Bitwise OR: `Rd = Rn | op2`
    ORR,

    /// Move: `Rd = op2`
    MOV,

    /// Bit clear: `Rd = Rn & !op2`
    BIC,

    /// Move negative: `Rd = !op2`
    MVN,
}

impl DataOpcode {
    pub fn from_bits(bits: u8) -> DataOpcode {
        match bits & 0xF {
            0b0000 => DataOpcode::AND,
            0b0001 => DataOpcode::EOR,
            0b0010 => DataOpcode::SUB,
            0b0011 => DataOpcode::RSB,
            0b0100 => DataOpcode::ADD,
            0b0101 => DataOpcode::ADC,
            0b0110 => DataOpcode::SBC,
            0b0111 => DataOpcode::RSC,
            0b1000 => DataOpcode::TST,
            0b1001 => DataOpcode::TEQ,
            0b1010 => DataOpcode::CMP,
            0b1011 => DataOpcode::CMN,
            0b1100 => DataOpcode::ORR,
            0b1101 => DataOpcode::MOV,
            0b1110 => DataOpcode::BIC,
            _ => DataOpcode::MVN,
        }
    }

    /// The comparison opcodes update flags but never write `Rd`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            DataOpcode::TST | DataOpcode::TEQ | DataOpcode::CMP | DataOpcode::CMN
        )
    }

    /// Logical opcodes take their carry from the barrel shifter and leave
    /// the overflow flag alone.
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            DataOpcode::AND
                | DataOpcode::EOR
                | DataOpcode::TST
                | DataOpcode::TEQ
                | DataOpcode::ORR
                | DataOpcode::MOV
                | DataOpcode::BIC
                | DataOpcode::MVN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trips() {
        for bits in 0..16u8 {
            assert_eq!(DataOpcode::from_bits(bits) as u8, bits);
        }
    }

    #[test]
    fn comparisons_are_logical_or_arithmetic_consistently() {
        assert!(DataOpcode::TST.is_logical());
        assert!(DataOpcode::TEQ.is_logical());
        assert!(!DataOpcode::CMP.is_logical());
        assert!(!DataOpcode::CMN.is_logical());
        assert!(DataOpcode::CMP.is_comparison());
        assert!(!DataOpcode::MOV.is_comparison());
    }
}
