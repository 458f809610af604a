use crate::ast::SourceInstruction;
use crate::parser::{parse_number, parse_value};
use mipsel_types::constants::{register_index, REG_RA};
use mipsel_types::instruction::{ITypeOp, Instruction, JTypeOp, RTypeOp};
use mipsel_types::MipsError;
use std::collections::HashMap;

/// Shape a source instruction into an encoded form, using its absolute
/// address and the resolved label table. Each mnemonic family has its own
/// operand layout (see the operand shape table in the assembler docs).
pub fn lower_instruction(
    source: &SourceInstruction,
    address: u32,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<Instruction, MipsError> {
    let mnemonic = source.mnemonic.as_str();

    if let Some(funct) = RTypeOp::from_mnemonic(mnemonic) {
        return lower_r_type(funct, source, line_number, line);
    }
    if let Some(op) = ITypeOp::from_mnemonic(mnemonic) {
        return lower_i_type(op, source, address, labels, line_number, line);
    }
    if let Some(op) = JTypeOp::from_mnemonic(mnemonic) {
        return lower_j_type(op, source, labels, line_number, line);
    }

    Err(MipsError::parse(
        format!("unknown instruction: {}", mnemonic),
        line_number,
        line,
    ))
}

fn operand<'a>(
    source: &'a SourceInstruction,
    index: usize,
    line_number: usize,
    line: &str,
) -> Result<&'a str, MipsError> {
    source.operands.get(index).map(String::as_str).ok_or_else(|| {
        MipsError::parse(
            format!("missing operand for {}", source.mnemonic),
            line_number,
            line,
        )
    })
}

fn parse_register(text: &str, line_number: usize, line: &str) -> Result<u8, MipsError> {
    register_index(text).ok_or_else(|| {
        MipsError::parse(format!("unknown register: {}", text), line_number, line)
    })
}

fn lower_r_type(
    funct: RTypeOp,
    source: &SourceInstruction,
    line_number: usize,
    line: &str,
) -> Result<Instruction, MipsError> {
    let operand = |index| operand(source, index, line_number, line);
    let register = |text| parse_register(text, line_number, line);

    Ok(match funct {
        // op rd, rt, shamt
        RTypeOp::Sll | RTypeOp::Srl | RTypeOp::Sra => {
            let rd = register(operand(0)?)?;
            let rt = register(operand(1)?)?;
            let shamt = parse_shift_amount(operand(2)?, line_number, line)?;
            Instruction::R {
                rs: 0,
                rt,
                rd,
                shamt,
                funct,
            }
        }
        // op rd, rt, rs: the shift amount comes from rs
        RTypeOp::Sllv | RTypeOp::Srlv | RTypeOp::Srav => {
            let rd = register(operand(0)?)?;
            let rt = register(operand(1)?)?;
            let rs = register(operand(2)?)?;
            Instruction::R {
                rs,
                rt,
                rd,
                shamt: 0,
                funct,
            }
        }
        RTypeOp::Jr => Instruction::R {
            rs: register(operand(0)?)?,
            rt: 0,
            rd: 0,
            shamt: 0,
            funct,
        },
        // jalr rs, or jalr rd, rs; rd defaults to $ra
        RTypeOp::Jalr => {
            if source.operands.len() == 1 {
                Instruction::R {
                    rs: register(operand(0)?)?,
                    rt: 0,
                    rd: REG_RA,
                    shamt: 0,
                    funct,
                }
            } else {
                let rd = register(operand(0)?)?;
                let rs = register(operand(1)?)?;
                Instruction::R {
                    rs,
                    rt: 0,
                    rd,
                    shamt: 0,
                    funct,
                }
            }
        }
        RTypeOp::Mfhi | RTypeOp::Mflo => Instruction::R {
            rs: 0,
            rt: 0,
            rd: register(operand(0)?)?,
            shamt: 0,
            funct,
        },
        RTypeOp::Mthi | RTypeOp::Mtlo => Instruction::R {
            rs: register(operand(0)?)?,
            rt: 0,
            rd: 0,
            shamt: 0,
            funct,
        },
        // op rs, rt
        RTypeOp::Mult | RTypeOp::Multu | RTypeOp::Div | RTypeOp::Divu => {
            let rs = register(operand(0)?)?;
            let rt = register(operand(1)?)?;
            Instruction::R {
                rs,
                rt,
                rd: 0,
                shamt: 0,
                funct,
            }
        }
        // op rd, rs, rt
        _ => {
            let rd = register(operand(0)?)?;
            let rs = register(operand(1)?)?;
            let rt = register(operand(2)?)?;
            Instruction::R {
                rs,
                rt,
                rd,
                shamt: 0,
                funct,
            }
        }
    })
}

fn lower_i_type(
    op: ITypeOp,
    source: &SourceInstruction,
    address: u32,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<Instruction, MipsError> {
    let operand = |index| operand(source, index, line_number, line);
    let register = |text| parse_register(text, line_number, line);

    Ok(match op {
        // op rt, offset(base)
        ITypeOp::Lb
        | ITypeOp::Lh
        | ITypeOp::Lw
        | ITypeOp::Lbu
        | ITypeOp::Lhu
        | ITypeOp::Sb
        | ITypeOp::Sh
        | ITypeOp::Sw => {
            let rt = register(operand(0)?)?;
            let (offset, rs) = parse_memory_operand(operand(1)?, line_number, line)?;
            Instruction::I {
                op,
                rs,
                rt,
                immediate: offset as u16,
            }
        }
        // op rs, rt, label
        ITypeOp::Beq | ITypeOp::Bne => {
            let rs = register(operand(0)?)?;
            let rt = register(operand(1)?)?;
            let immediate = branch_offset(operand(2)?, address, labels, line_number, line)?;
            Instruction::I {
                op,
                rs,
                rt,
                immediate,
            }
        }
        // op rs, label
        ITypeOp::Blez | ITypeOp::Bgtz => {
            let rs = register(operand(0)?)?;
            let immediate = branch_offset(operand(1)?, address, labels, line_number, line)?;
            Instruction::I {
                op,
                rs,
                rt: 0,
                immediate,
            }
        }
        // trap, or trap imm
        ITypeOp::Trap => {
            let immediate = match source.operands.first() {
                Some(text) => resolve_immediate(text, labels, line_number, line)?,
                None => 0,
            };
            Instruction::I {
                op,
                rs: 0,
                rt: 0,
                immediate,
            }
        }
        // Two-operand form: op rt, imm (rs unused)
        ITypeOp::Llo | ITypeOp::Lhi if source.operands.len() == 2 => {
            let rt = register(operand(0)?)?;
            let immediate = resolve_immediate(operand(1)?, labels, line_number, line)?;
            Instruction::I {
                op,
                rs: 0,
                rt,
                immediate,
            }
        }
        // op rt, rs, imm
        _ => {
            let rt = register(operand(0)?)?;
            let rs = register(operand(1)?)?;
            let immediate = resolve_immediate(operand(2)?, labels, line_number, line)?;
            Instruction::I {
                op,
                rs,
                rt,
                immediate,
            }
        }
    })
}

// j label_or_address
fn lower_j_type(
    op: JTypeOp,
    source: &SourceInstruction,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<Instruction, MipsError> {
    let target = source.operands.first().ok_or_else(|| {
        MipsError::parse(
            format!("missing target in jump: {}", source.mnemonic),
            line_number,
            line,
        )
    })?;

    let address = resolve_value(target, labels, line_number, line)? as u32;

    Ok(Instruction::jump(op, address >> 2))
}

/// Encode a branch target label as a signed word offset relative to the
/// fall-through PC, truncated to 16 bits.
fn branch_offset(
    label: &str,
    address: u32,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<u16, MipsError> {
    let target = *labels.get(label).ok_or_else(|| {
        MipsError::parse(
            format!("unknown label in branch: {}", label),
            line_number,
            line,
        )
    })?;

    let offset = (target as i64 - (address as i64 + 4)) / 4;
    Ok(offset as u16)
}

/// Resolve a numeric or label operand and truncate it to the 16-bit
/// immediate field.
fn resolve_immediate(
    text: &str,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<u16, MipsError> {
    Ok(resolve_value(text, labels, line_number, line)? as u16)
}

pub(crate) fn resolve_value(
    text: &str,
    labels: &HashMap<String, u32>,
    line_number: usize,
    line: &str,
) -> Result<i64, MipsError> {
    parse_value(text, line_number, line)?
        .resolve(labels)
        .map_err(|name| {
            MipsError::parse(format!("unknown label: {}", name), line_number, line)
        })
}

fn parse_shift_amount(text: &str, line_number: usize, line: &str) -> Result<u8, MipsError> {
    let value = parse_number(text).ok_or_else(|| {
        MipsError::parse(
            format!("invalid shift amount: {}", text),
            line_number,
            line,
        )
    })?;

    Ok((value & 0x1F) as u8)
}

/// `offset(base)`: a signed decimal or hex offset (empty means 0) around
/// a parenthesized base register.
fn parse_memory_operand(
    text: &str,
    line_number: usize,
    line: &str,
) -> Result<(i32, u8), MipsError> {
    let invalid = || {
        MipsError::parse(
            format!("invalid memory operand: {}", text),
            line_number,
            line,
        )
    };

    let open = text.find('(').ok_or_else(invalid)?;
    let close = text.find(')').ok_or_else(invalid)?;
    if close <= open {
        return Err(invalid());
    }

    let offset_text = text[..open].trim();
    let offset = if offset_text.is_empty() {
        0
    } else {
        parse_number(offset_text).ok_or_else(invalid)? as i32
    };

    let base = parse_register(text[open + 1..close].trim(), line_number, line)?;

    Ok((offset, base))
}
