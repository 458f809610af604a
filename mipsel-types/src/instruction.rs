use crate::constants::REGISTER_NAMES;
use crate::error::MipsError;
use num_enum::TryFromPrimitive;
use std::convert::TryFrom;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Function codes of R-type instructions (major opcode 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum RTypeOp {
    Sll = 0x00,
    Srl = 0x02,
    Sra = 0x03,
    Sllv = 0x04,
    Srlv = 0x06,
    Srav = 0x07,
    Jr = 0x08,
    Jalr = 0x09,
    Mfhi = 0x10,
    Mthi = 0x11,
    Mflo = 0x12,
    Mtlo = 0x13,
    Mult = 0x18,
    Multu = 0x19,
    Div = 0x1A,
    Divu = 0x1B,
    Add = 0x20,
    Addu = 0x21,
    Sub = 0x22,
    Subu = 0x23,
    And = 0x24,
    Or = 0x25,
    Xor = 0x26,
    Nor = 0x27,
    Slt = 0x2A,
    Sltu = 0x2B,
}

/// Major opcodes of I-type instructions.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum ITypeOp {
    Beq = 0x04,
    Bne = 0x05,
    Blez = 0x06,
    Bgtz = 0x07,
    Addi = 0x08,
    Addiu = 0x09,
    Slti = 0x0A,
    Sltiu = 0x0B,
    Andi = 0x0C,
    Ori = 0x0D,
    Xori = 0x0E,
    Llo = 0x18,
    Lhi = 0x19,
    Trap = 0x1A,
    Lb = 0x20,
    Lh = 0x21,
    Lw = 0x23,
    Lbu = 0x24,
    Lhu = 0x25,
    Sb = 0x28,
    Sh = 0x29,
    Sw = 0x2B,
}

/// Major opcodes of J-type instructions.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum JTypeOp {
    J = 0x02,
    Jal = 0x03,
}

impl RTypeOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            RTypeOp::Sll => "sll",
            RTypeOp::Srl => "srl",
            RTypeOp::Sra => "sra",
            RTypeOp::Sllv => "sllv",
            RTypeOp::Srlv => "srlv",
            RTypeOp::Srav => "srav",
            RTypeOp::Jr => "jr",
            RTypeOp::Jalr => "jalr",
            RTypeOp::Mfhi => "mfhi",
            RTypeOp::Mthi => "mthi",
            RTypeOp::Mflo => "mflo",
            RTypeOp::Mtlo => "mtlo",
            RTypeOp::Mult => "mult",
            RTypeOp::Multu => "multu",
            RTypeOp::Div => "div",
            RTypeOp::Divu => "divu",
            RTypeOp::Add => "add",
            RTypeOp::Addu => "addu",
            RTypeOp::Sub => "sub",
            RTypeOp::Subu => "subu",
            RTypeOp::And => "and",
            RTypeOp::Or => "or",
            RTypeOp::Xor => "xor",
            RTypeOp::Nor => "nor",
            RTypeOp::Slt => "slt",
            RTypeOp::Sltu => "sltu",
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Some(match mnemonic {
            "sll" => RTypeOp::Sll,
            "srl" => RTypeOp::Srl,
            "sra" => RTypeOp::Sra,
            "sllv" => RTypeOp::Sllv,
            "srlv" => RTypeOp::Srlv,
            "srav" => RTypeOp::Srav,
            "jr" => RTypeOp::Jr,
            "jalr" => RTypeOp::Jalr,
            "mfhi" => RTypeOp::Mfhi,
            "mthi" => RTypeOp::Mthi,
            "mflo" => RTypeOp::Mflo,
            "mtlo" => RTypeOp::Mtlo,
            "mult" => RTypeOp::Mult,
            "multu" => RTypeOp::Multu,
            "div" => RTypeOp::Div,
            "divu" => RTypeOp::Divu,
            "add" => RTypeOp::Add,
            "addu" => RTypeOp::Addu,
            "sub" => RTypeOp::Sub,
            "subu" => RTypeOp::Subu,
            "and" => RTypeOp::And,
            "or" => RTypeOp::Or,
            "xor" => RTypeOp::Xor,
            "nor" => RTypeOp::Nor,
            "slt" => RTypeOp::Slt,
            "sltu" => RTypeOp::Sltu,
            _ => return None,
        })
    }
}

impl ITypeOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ITypeOp::Beq => "beq",
            ITypeOp::Bne => "bne",
            ITypeOp::Blez => "blez",
            ITypeOp::Bgtz => "bgtz",
            ITypeOp::Addi => "addi",
            ITypeOp::Addiu => "addiu",
            ITypeOp::Slti => "slti",
            ITypeOp::Sltiu => "sltiu",
            ITypeOp::Andi => "andi",
            ITypeOp::Ori => "ori",
            ITypeOp::Xori => "xori",
            ITypeOp::Llo => "llo",
            ITypeOp::Lhi => "lhi",
            ITypeOp::Trap => "trap",
            ITypeOp::Lb => "lb",
            ITypeOp::Lh => "lh",
            ITypeOp::Lw => "lw",
            ITypeOp::Lbu => "lbu",
            ITypeOp::Lhu => "lhu",
            ITypeOp::Sb => "sb",
            ITypeOp::Sh => "sh",
            ITypeOp::Sw => "sw",
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Some(match mnemonic {
            "beq" => ITypeOp::Beq,
            "bne" => ITypeOp::Bne,
            "blez" => ITypeOp::Blez,
            "bgtz" => ITypeOp::Bgtz,
            "addi" => ITypeOp::Addi,
            "addiu" => ITypeOp::Addiu,
            "slti" => ITypeOp::Slti,
            "sltiu" => ITypeOp::Sltiu,
            "andi" => ITypeOp::Andi,
            "ori" => ITypeOp::Ori,
            "xori" => ITypeOp::Xori,
            "llo" => ITypeOp::Llo,
            "lhi" => ITypeOp::Lhi,
            "trap" => ITypeOp::Trap,
            "lb" => ITypeOp::Lb,
            "lh" => ITypeOp::Lh,
            "lw" => ITypeOp::Lw,
            "lbu" => ITypeOp::Lbu,
            "lhu" => ITypeOp::Lhu,
            "sb" => ITypeOp::Sb,
            "sh" => ITypeOp::Sh,
            "sw" => ITypeOp::Sw,
            _ => return None,
        })
    }
}

impl JTypeOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            JTypeOp::J => "j",
            JTypeOp::Jal => "jal",
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Some(match mnemonic {
            "j" => JTypeOp::J,
            "jal" => JTypeOp::Jal,
            _ => return None,
        })
    }
}

/// A decoded instruction in one of the three 32-bit layouts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Instruction {
    R {
        rs: u8,
        rt: u8,
        rd: u8,
        shamt: u8,
        funct: RTypeOp,
    },
    I {
        op: ITypeOp,
        rs: u8,
        rt: u8,
        immediate: u16,
    },
    J {
        op: JTypeOp,
        address: u32,
    },
}

impl Instruction {
    /// Build a J-type instruction, truncating the address to its 26-bit
    /// field.
    pub fn jump(op: JTypeOp, address: u32) -> Self {
        Instruction::J {
            op,
            address: address & 0x03FF_FFFF,
        }
    }

    /// Encode the instruction as a 32-bit word.
    pub fn encode(&self) -> u32 {
        match *self {
            Instruction::R {
                rs,
                rt,
                rd,
                shamt,
                funct,
            } => {
                (rs as u32) << 21
                    | (rt as u32) << 16
                    | (rd as u32) << 11
                    | (shamt as u32) << 6
                    | funct as u32
            }
            Instruction::I {
                op,
                rs,
                rt,
                immediate,
            } => (op as u32) << 26 | (rs as u32) << 21 | (rt as u32) << 16 | immediate as u32,
            Instruction::J { op, address } => (op as u32) << 26 | (address & 0x03FF_FFFF),
        }
    }

    /// Decode a 32-bit word. Dispatches on the major opcode: 0x00 is
    /// R-type (the operation comes from the low 6 bits), 0x02/0x03 are
    /// J-type, everything else is I-type.
    pub fn decode(word: u32) -> Result<Self, MipsError> {
        let opcode = (word >> 26) as u8;

        match opcode {
            0x00 => {
                let funct = RTypeOp::try_from((word & 0x3F) as u8)
                    .map_err(|_| MipsError::UnknownInstruction(format!("0x{:08x}", word)))?;

                Ok(Instruction::R {
                    rs: (word >> 21 & 0x1F) as u8,
                    rt: (word >> 16 & 0x1F) as u8,
                    rd: (word >> 11 & 0x1F) as u8,
                    shamt: (word >> 6 & 0x1F) as u8,
                    funct,
                })
            }
            0x02 => Ok(Instruction::J {
                op: JTypeOp::J,
                address: word & 0x03FF_FFFF,
            }),
            0x03 => Ok(Instruction::J {
                op: JTypeOp::Jal,
                address: word & 0x03FF_FFFF,
            }),
            _ => {
                let op = ITypeOp::try_from(opcode)
                    .map_err(|_| MipsError::UnknownInstruction(format!("0x{:08x}", word)))?;

                Ok(Instruction::I {
                    op,
                    rs: (word >> 21 & 0x1F) as u8,
                    rt: (word >> 16 & 0x1F) as u8,
                    immediate: (word & 0xFFFF) as u16,
                })
            }
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match *self {
            Instruction::R { funct, .. } => funct.mnemonic(),
            Instruction::I { op, .. } => op.mnemonic(),
            Instruction::J { op, .. } => op.mnemonic(),
        }
    }

    /// Whether executing this instruction ends the run.
    pub fn is_trap(&self) -> bool {
        matches!(
            self,
            Instruction::I {
                op: ITypeOp::Trap,
                ..
            }
        )
    }
}

/// Replicate bit 15 of `value` into bits 16-31.
pub fn sign_extend_16(value: u16) -> u32 {
    value as i16 as u32
}

/// Replicate bit 7 of `value` into bits 8-31.
pub fn sign_extend_8(value: u8) -> u32 {
    value as i8 as u32
}

pub fn zero_extend_16(value: u16) -> u32 {
    value as u32
}

pub fn zero_extend_8(value: u8) -> u32 {
    value as u32
}

/// Pretty-print the register using its name
struct Register(u8);

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(REGISTER_NAMES[self.0 as usize & 0x1F])
    }
}

impl Display for Instruction {
    /// Format the instruction the way it would appear in assembly source.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::R {
                rs,
                rt,
                rd,
                shamt,
                funct,
            } => match funct {
                RTypeOp::Sll if self.encode() == 0 => write!(f, "noop"),
                RTypeOp::Sll | RTypeOp::Srl | RTypeOp::Sra => write!(
                    f,
                    "{} {}, {}, {}",
                    funct.mnemonic(),
                    Register(rd),
                    Register(rt),
                    shamt
                ),
                RTypeOp::Sllv | RTypeOp::Srlv | RTypeOp::Srav => write!(
                    f,
                    "{} {}, {}, {}",
                    funct.mnemonic(),
                    Register(rd),
                    Register(rt),
                    Register(rs)
                ),
                RTypeOp::Jr => write!(f, "jr {}", Register(rs)),
                RTypeOp::Jalr => write!(f, "jalr {}, {}", Register(rd), Register(rs)),
                RTypeOp::Mfhi | RTypeOp::Mflo => {
                    write!(f, "{} {}", funct.mnemonic(), Register(rd))
                }
                RTypeOp::Mthi | RTypeOp::Mtlo => {
                    write!(f, "{} {}", funct.mnemonic(), Register(rs))
                }
                RTypeOp::Mult | RTypeOp::Multu | RTypeOp::Div | RTypeOp::Divu => {
                    write!(f, "{} {}, {}", funct.mnemonic(), Register(rs), Register(rt))
                }
                _ => write!(
                    f,
                    "{} {}, {}, {}",
                    funct.mnemonic(),
                    Register(rd),
                    Register(rs),
                    Register(rt)
                ),
            },
            Instruction::I {
                op,
                rs,
                rt,
                immediate,
            } => match op {
                ITypeOp::Beq | ITypeOp::Bne => write!(
                    f,
                    "{} {}, {}, {}",
                    op.mnemonic(),
                    Register(rs),
                    Register(rt),
                    immediate as i16
                ),
                ITypeOp::Blez | ITypeOp::Bgtz => {
                    write!(f, "{} {}, {}", op.mnemonic(), Register(rs), immediate as i16)
                }
                ITypeOp::Llo | ITypeOp::Lhi => {
                    write!(f, "{} {}, 0x{:x}", op.mnemonic(), Register(rt), immediate)
                }
                ITypeOp::Andi | ITypeOp::Ori | ITypeOp::Xori => write!(
                    f,
                    "{} {}, {}, 0x{:x}",
                    op.mnemonic(),
                    Register(rt),
                    Register(rs),
                    immediate
                ),
                ITypeOp::Trap => write!(f, "trap {}", immediate),
                ITypeOp::Lb
                | ITypeOp::Lh
                | ITypeOp::Lw
                | ITypeOp::Lbu
                | ITypeOp::Lhu
                | ITypeOp::Sb
                | ITypeOp::Sh
                | ITypeOp::Sw => write!(
                    f,
                    "{} {}, {}({})",
                    op.mnemonic(),
                    Register(rt),
                    immediate as i16,
                    Register(rs)
                ),
                _ => write!(
                    f,
                    "{} {}, {}, {}",
                    op.mnemonic(),
                    Register(rt),
                    Register(rs),
                    immediate as i16
                ),
            },
            Instruction::J { op, address } => {
                write!(f, "{} 0x{:x}", op.mnemonic(), address << 2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_R: [RTypeOp; 26] = [
        RTypeOp::Sll,
        RTypeOp::Srl,
        RTypeOp::Sra,
        RTypeOp::Sllv,
        RTypeOp::Srlv,
        RTypeOp::Srav,
        RTypeOp::Jr,
        RTypeOp::Jalr,
        RTypeOp::Mfhi,
        RTypeOp::Mthi,
        RTypeOp::Mflo,
        RTypeOp::Mtlo,
        RTypeOp::Mult,
        RTypeOp::Multu,
        RTypeOp::Div,
        RTypeOp::Divu,
        RTypeOp::Add,
        RTypeOp::Addu,
        RTypeOp::Sub,
        RTypeOp::Subu,
        RTypeOp::And,
        RTypeOp::Or,
        RTypeOp::Xor,
        RTypeOp::Nor,
        RTypeOp::Slt,
        RTypeOp::Sltu,
    ];

    const ALL_I: [ITypeOp; 22] = [
        ITypeOp::Beq,
        ITypeOp::Bne,
        ITypeOp::Blez,
        ITypeOp::Bgtz,
        ITypeOp::Addi,
        ITypeOp::Addiu,
        ITypeOp::Slti,
        ITypeOp::Sltiu,
        ITypeOp::Andi,
        ITypeOp::Ori,
        ITypeOp::Xori,
        ITypeOp::Llo,
        ITypeOp::Lhi,
        ITypeOp::Trap,
        ITypeOp::Lb,
        ITypeOp::Lh,
        ITypeOp::Lw,
        ITypeOp::Lbu,
        ITypeOp::Lhu,
        ITypeOp::Sb,
        ITypeOp::Sh,
        ITypeOp::Sw,
    ];

    #[test]
    fn round_trip_r_type() {
        for &funct in &ALL_R {
            let instruction = Instruction::R {
                rs: 3,
                rt: 7,
                rd: 21,
                shamt: 13,
                funct,
            };
            let word = instruction.encode();
            assert_eq!(word >> 26, 0, "R-type major opcode must be zero");
            assert_eq!(Instruction::decode(word).unwrap(), instruction);
        }
    }

    #[test]
    fn round_trip_i_type() {
        for &op in &ALL_I {
            let instruction = Instruction::I {
                op,
                rs: 29,
                rt: 8,
                immediate: 0xBEEF,
            };
            assert_eq!(
                Instruction::decode(instruction.encode()).unwrap(),
                instruction
            );
        }
    }

    #[test]
    fn round_trip_j_type() {
        for &op in &[JTypeOp::J, JTypeOp::Jal] {
            let instruction = Instruction::jump(op, 0x012A_BCDE);
            assert_eq!(
                Instruction::decode(instruction.encode()).unwrap(),
                instruction
            );
        }
    }

    #[test]
    fn jump_address_is_truncated_to_26_bits() {
        match Instruction::jump(JTypeOp::J, 0xFFFF_FFFF) {
            Instruction::J { address, .. } => assert_eq!(address, 0x03FF_FFFF),
            other => panic!("expected a J-type instruction, got {:?}", other),
        }
    }

    #[test]
    fn encode_matches_manual_layout() {
        let add = Instruction::R {
            rs: 9,
            rt: 10,
            rd: 8,
            shamt: 0,
            funct: RTypeOp::Add,
        };
        assert_eq!(add.encode(), 9 << 21 | 10 << 16 | 8 << 11 | 0x20);

        let addi = Instruction::I {
            op: ITypeOp::Addi,
            rs: 0,
            rt: 8,
            immediate: 3,
        };
        assert_eq!(addi.encode(), 0x08 << 26 | 8 << 16 | 3);

        let jal = Instruction::jump(JTypeOp::Jal, 0x100);
        assert_eq!(jal.encode(), (0x03 << 26) | 0x100);
    }

    #[test]
    fn unknown_words_fail_to_decode() {
        // Funct 0x3F is unassigned
        assert!(matches!(
            Instruction::decode(0x0000_003F),
            Err(MipsError::UnknownInstruction(_))
        ));
        // Major opcode 0x3F is unassigned
        assert!(matches!(
            Instruction::decode(0xFC00_0000),
            Err(MipsError::UnknownInstruction(_))
        ));
    }

    #[test]
    fn only_trap_instructions_are_traps() {
        let trap = Instruction::I {
            op: ITypeOp::Trap,
            rs: 0,
            rt: 0,
            immediate: 5,
        };
        assert!(trap.is_trap());

        let addi = Instruction::I {
            op: ITypeOp::Addi,
            rs: 0,
            rt: 8,
            immediate: 5,
        };
        assert!(!addi.is_trap());
        assert!(!Instruction::decode(0).unwrap().is_trap());
    }

    #[test]
    fn extension_helpers() {
        assert_eq!(sign_extend_16(0x8000), 0xFFFF_8000);
        assert_eq!(sign_extend_16(0x7FFF), 0x0000_7FFF);
        assert_eq!(sign_extend_16(0xFFFF), 0xFFFF_FFFF);
        assert_eq!(zero_extend_16(0xFFFF), 0x0000_FFFF);
        assert_eq!(sign_extend_8(0x80), 0xFFFF_FF80);
        assert_eq!(sign_extend_8(0x7F), 0x0000_007F);
        assert_eq!(zero_extend_8(0xFF), 0x0000_00FF);
    }

    #[test]
    fn display_uses_register_names() {
        let add = Instruction::R {
            rs: 9,
            rt: 10,
            rd: 8,
            shamt: 0,
            funct: RTypeOp::Add,
        };
        assert_eq!(add.to_string(), "add $t0, $t1, $t2");

        let lw = Instruction::I {
            op: ITypeOp::Lw,
            rs: 29,
            rt: 4,
            immediate: 0xFFFC,
        };
        assert_eq!(lw.to_string(), "lw $a0, -4($sp)");

        assert_eq!(Instruction::decode(0).unwrap().to_string(), "noop");
    }
}
