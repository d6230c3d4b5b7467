use super::condition::Condition;
use super::error::Error;
use super::opcode::DataOpcode;
use super::shifter::{ShiftAmount, ShiftKind, ShiftSpec};
use super::Result;

/// A fully decoded instruction: the condition field plus one of the
/// supported operation classes.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Instruction {
    pub condition: Condition,
    pub op: Operation,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Operation {
    Branch { link: bool, target: BranchTarget },
    Data {
        opcode: DataOpcode,
        rn: usize,
        rd: usize,
        set_flags: bool,
        op2: Operand2,
    },
    Mem(MemAccess),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BranchTarget {
    /// Offset relative to the address of the branch instruction itself, with
    /// the pipeline's `+8` already folded in by the decoder.
    Immediate { offset: i32 },

    /// BX-style branch to the address held in a register.
    Register { rn: usize },
}

/// The second operand of a data operation.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Operand2 {
    /// An 8-bit literal with its encoded rotation. A rotation of 0 means the
    /// literal is used as-is.
    Immediate { value: u32, shift: ShiftSpec },

    /// A register run through the barrel shifter.
    Register { rm: usize, shift: ShiftSpec },
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MemMode {
    LDR,
    STR,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MemOffset {
    Immediate(u32),
    Register { rm: usize, shift: ShiftSpec },
}

/// A single-register memory transfer, covering the word/byte class and the
/// half-word/signed class.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct MemAccess {
    pub mode: MemMode,
    pub base: usize,
    pub rd: usize,

    /// `+1` to add the offset to the base, `-1` to subtract it.
    pub sign: i32,

    /// Pre-indexed: the offset applies before the access. Post-indexed
    /// accesses use the plain base address and always write back.
    pub pre: bool,

    pub writeback: bool,

    /// Transfer sizes: `byte` → 1, `half` → 2, neither → 4.
    pub byte: bool,
    pub half: bool,

    /// Sign-extend the loaded value from bit 7 (byte) or bit 15 (half).
    pub signed: bool,

    pub offset: MemOffset,
}

const BX_MASK: u32 = 0x0FFF_FFF0;
const BX_PATTERN: u32 = 0x012F_FF10;

impl Instruction {
    /// Decode a little-endian 32-bit instruction word.
    ///
    /// Recognised classes: branch (immediate and BX-style register), data
    /// processing, word/byte transfers and half-word/signed transfers.
    /// Anything else, including the unsupported multiply/block-transfer/
    /// coprocessor regions, is an illegal encoding.
    pub fn decode(word: u32) -> Result<Instruction> {
        let condition = Condition::from_bits((word >> 28) as u8);

        let op = if word & BX_MASK == BX_PATTERN {
            Operation::Branch {
                link: false,
                target: BranchTarget::Register {
                    rn: (word & 0xF) as usize,
                },
            }
        } else {
            match (word >> 25) & 0b111 {
                0b101 => decode_branch(word),
                0b010 | 0b011 => decode_word_byte(word)?,
                // Bits 7 and 4 set in the register-operand region select the
                // half-word/signed transfer encoding.
                0b000 if word & 0x0000_0090 == 0x0000_0090 => decode_half_signed(word),
                0b000 | 0b001 => decode_data(word)?,
                _ => return Err(Error::IllegalEncoding(word)),
            }
        };

        Ok(Instruction { condition, op })
    }
}

fn decode_branch(word: u32) -> Operation {
    // The 24-bit signed word offset is relative to the fetch address plus 8;
    // folding the 8 in here lets the executor treat the offset as relative
    // to the instruction's own address.
    let offset = ((word << 8) as i32 >> 6) + 8;

    Operation::Branch {
        link: word & (1 << 24) != 0,
        target: BranchTarget::Immediate { offset },
    }
}

fn decode_word_byte(word: u32) -> Result<Operation> {
    let pre = word & (1 << 24) != 0;

    let offset = if word & (1 << 25) == 0 {
        MemOffset::Immediate(word & 0xFFF)
    } else {
        // Register offsets only allow shifts by an immediate amount.
        if word & (1 << 4) != 0 {
            return Err(Error::IllegalEncoding(word));
        }
        MemOffset::Register {
            rm: (word & 0xF) as usize,
            shift: ShiftSpec::new(
                shift_kind(word),
                ShiftAmount::Immediate(((word >> 7) & 0x1F) as u8),
            ),
        }
    };

    Ok(Operation::Mem(MemAccess {
        mode: if word & (1 << 20) != 0 {
            MemMode::LDR
        } else {
            MemMode::STR
        },
        base: ((word >> 16) & 0xF) as usize,
        rd: ((word >> 12) & 0xF) as usize,
        sign: if word & (1 << 23) != 0 { 1 } else { -1 },
        pre,
        writeback: word & (1 << 21) != 0 || !pre,
        byte: word & (1 << 22) != 0,
        half: false,
        signed: false,
        offset,
    }))
}

fn decode_half_signed(word: u32) -> Operation {
    let pre = word & (1 << 24) != 0;

    // Unlike the word/byte class, a set bit 22 means the offset is an
    // immediate, split into a low nibble at bits 3..0 and a high nibble at
    // bits 11..8. Register offsets take no shift.
    let offset = if word & (1 << 22) != 0 {
        MemOffset::Immediate(((word >> 4) & 0xF0) | (word & 0xF))
    } else {
        MemOffset::Register {
            rm: (word & 0xF) as usize,
            shift: ShiftSpec::new(ShiftKind::LSL, ShiftAmount::Immediate(0)),
        }
    };

    Operation::Mem(MemAccess {
        mode: if word & (1 << 20) != 0 {
            MemMode::LDR
        } else {
            MemMode::STR
        },
        base: ((word >> 16) & 0xF) as usize,
        rd: ((word >> 12) & 0xF) as usize,
        sign: if word & (1 << 23) != 0 { 1 } else { -1 },
        pre,
        writeback: word & (1 << 21) != 0 || !pre,
        byte: word & (1 << 5) == 0,
        half: word & (1 << 5) != 0,
        signed: word & (1 << 6) != 0,
        offset,
    })
}

fn decode_data(word: u32) -> Result<Operation> {
    let op2 = if word & (1 << 25) != 0 {
        Operand2::Immediate {
            value: word & 0xFF,
            shift: ShiftSpec::new(
                ShiftKind::ROR,
                ShiftAmount::Immediate((((word >> 8) & 0xF) * 2) as u8),
            ),
        }
    } else {
        let amount = if word & (1 << 4) == 0 {
            ShiftAmount::Immediate(((word >> 7) & 0x1F) as u8)
        } else if word & (1 << 7) == 0 {
            ShiftAmount::Register(((word >> 8) & 0xF) as usize)
        } else {
            return Err(Error::IllegalEncoding(word));
        };
        Operand2::Register {
            rm: (word & 0xF) as usize,
            shift: ShiftSpec::new(shift_kind(word), amount),
        }
    };

    Ok(Operation::Data {
        opcode: DataOpcode::from_bits(((word >> 21) & 0xF) as u8),
        rn: ((word >> 16) & 0xF) as usize,
        rd: ((word >> 12) & 0xF) as usize,
        set_flags: word & (1 << 20) != 0,
        op2,
    })
}

fn shift_kind(word: u32) -> ShiftKind {
    match (word >> 5) & 0b11 {
        0b00 => ShiftKind::LSL,
        0b01 => ShiftKind::LSR,
        0b10 => ShiftKind::ASR,
        _ => ShiftKind::ROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mov_immediate() {
        // MOV R0, #1
        let instr = Instruction::decode(0xE3A0_0001).unwrap();

        assert_eq!(instr.condition, Condition::AL);
        assert_eq!(
            instr.op,
            Operation::Data {
                opcode: DataOpcode::MOV,
                rn: 0,
                rd: 0,
                set_flags: false,
                op2: Operand2::Immediate {
                    value: 1,
                    shift: ShiftSpec::new(ShiftKind::ROR, ShiftAmount::Immediate(0)),
                },
            }
        );
    }

    #[test]
    fn decodes_rotated_immediates() {
        // ORR R0, R0, #0x34 ROR 16 (= 0x0034_0000)
        let instr = Instruction::decode(0xE380_0834).unwrap();

        match instr.op {
            Operation::Data {
                opcode: DataOpcode::ORR,
                op2:
                    Operand2::Immediate {
                        value: 0x34,
                        shift: ShiftSpec {
                            kind: ShiftKind::ROR,
                            amount: ShiftAmount::Immediate(16),
                        },
                    },
                ..
            } => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_register_operand_with_shift() {
        // ADDS R2, R1, R0, LSL #3
        let instr = Instruction::decode(0xE091_2180).unwrap();

        assert_eq!(
            instr.op,
            Operation::Data {
                opcode: DataOpcode::ADD,
                rn: 1,
                rd: 2,
                set_flags: true,
                op2: Operand2::Register {
                    rm: 0,
                    shift: ShiftSpec::new(ShiftKind::LSL, ShiftAmount::Immediate(3)),
                },
            }
        );
    }

    #[test]
    fn decodes_register_shift_amounts() {
        // MOV R0, R1, LSR R2
        let instr = Instruction::decode(0xE1A0_0231).unwrap();

        assert_eq!(
            instr.op,
            Operation::Data {
                opcode: DataOpcode::MOV,
                rn: 0,
                rd: 0,
                set_flags: false,
                op2: Operand2::Register {
                    rm: 1,
                    shift: ShiftSpec::new(ShiftKind::LSR, ShiftAmount::Register(2)),
                },
            }
        );
    }

    #[test]
    fn decodes_conditional_compare() {
        // CMPNE R3, #0
        let instr = Instruction::decode(0x1353_0000).unwrap();

        assert_eq!(instr.condition, Condition::NE);
        match instr.op {
            Operation::Data {
                opcode: DataOpcode::CMP,
                rn: 3,
                set_flags: true,
                ..
            } => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_branches_with_the_pipeline_offset_folded_in() {
        // B .+8 — an immediate field of zero still lands two words ahead.
        let instr = Instruction::decode(0xEA00_0000).unwrap();
        assert_eq!(
            instr.op,
            Operation::Branch {
                link: false,
                target: BranchTarget::Immediate { offset: 8 },
            }
        );

        // BL .-4
        let instr = Instruction::decode(0xEBFF_FFFD).unwrap();
        assert_eq!(
            instr.op,
            Operation::Branch {
                link: true,
                target: BranchTarget::Immediate { offset: -4 },
            }
        );
    }

    #[test]
    fn decodes_bx() {
        // BX LR
        let instr = Instruction::decode(0xE12F_FF1E).unwrap();

        assert_eq!(
            instr.op,
            Operation::Branch {
                link: false,
                target: BranchTarget::Register { rn: 14 },
            }
        );
    }

    #[test]
    fn decodes_word_transfers() {
        // LDR R2, [R1, #4]
        let instr = Instruction::decode(0xE591_2004).unwrap();

        assert_eq!(
            instr.op,
            Operation::Mem(MemAccess {
                mode: MemMode::LDR,
                base: 1,
                rd: 2,
                sign: 1,
                pre: true,
                writeback: false,
                byte: false,
                half: false,
                signed: false,
                offset: MemOffset::Immediate(4),
            })
        );
    }

    #[test]
    fn post_indexing_always_writes_back() {
        // LDR R2, [R1], #4
        let instr = Instruction::decode(0xE491_2004).unwrap();

        match instr.op {
            Operation::Mem(access) => {
                assert!(!access.pre);
                assert!(access.writeback);
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_byte_store_with_negative_offset() {
        // STRB R0, [R1, #-2]
        let instr = Instruction::decode(0xE541_0002).unwrap();

        match instr.op {
            Operation::Mem(access) => {
                assert_eq!(access.mode, MemMode::STR);
                assert!(access.byte);
                assert_eq!(access.sign, -1);
                assert_eq!(access.offset, MemOffset::Immediate(2));
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_half_signed_transfers() {
        // LDRSB R2, [R1]
        let instr = Instruction::decode(0xE1D1_20D0).unwrap();
        match instr.op {
            Operation::Mem(access) => {
                assert_eq!(access.mode, MemMode::LDR);
                assert!(access.byte && access.signed && !access.half);
                assert_eq!(access.offset, MemOffset::Immediate(0));
            }
            other => panic!("unexpected decode: {:?}", other),
        }

        // STRH R2, [R1]
        let instr = Instruction::decode(0xE1C1_20B0).unwrap();
        match instr.op {
            Operation::Mem(access) => {
                assert_eq!(access.mode, MemMode::STR);
                assert!(access.half && !access.byte && !access.signed);
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn half_signed_immediates_recombine_the_nibbles() {
        // LDRH R0, [R1, #0x21]
        let instr = Instruction::decode(0xE1D1_02B1).unwrap();

        match instr.op {
            Operation::Mem(access) => assert_eq!(access.offset, MemOffset::Immediate(0x21)),
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn rejects_the_unsupported_regions() {
        // LDM/STM block transfers
        assert!(matches!(
            Instruction::decode(0xE890_0003),
            Err(Error::IllegalEncoding(_))
        ));
        // SWI
        assert!(matches!(
            Instruction::decode(0xEF00_0000),
            Err(Error::IllegalEncoding(_))
        ));
        // Register-shifted register offset in a word transfer
        assert!(matches!(
            Instruction::decode(0xE791_2112),
            Err(Error::IllegalEncoding(_))
        ));
    }
}
