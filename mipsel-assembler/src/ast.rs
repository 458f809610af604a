use std::collections::HashMap;

/// A directive operand: a plain number, or a label with an optional
/// numeric addend (`table+4`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    Symbol { name: String, addend: i64 },
}

impl Value {
    /// Resolve against the label table. `Err` carries the unknown name.
    pub fn resolve<'a>(&'a self, labels: &HashMap<String, u32>) -> Result<i64, &'a str> {
        match self {
            Value::Number(number) => Ok(*number),
            Value::Symbol { name, addend } => match labels.get(name) {
                Some(&address) => Ok(address as i64 + addend),
                None => Err(name.as_str()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Text,
    Data,
    Byte(Vec<Value>),
    Half(Vec<Value>),
    Word(Vec<Value>),
    Ascii { text: String, nul_terminated: bool },
    Space(u32),
    /// Alignment exponent: pad to a multiple of 2^n
    Align(u32),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// An instruction as it appears in the source: the lower-cased mnemonic
/// and its comma-split operands, to be shaped during the second pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInstruction {
    pub mnemonic: String,
    pub operands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Label(String),
    Directive(Directive),
    Instruction(SourceInstruction),
}

/// One parsed element of the program, with its source position kept for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub line_number: usize,
    pub line: String,
}

#[derive(Debug, Default)]
pub struct Program {
    pub items: Vec<Item>,
}
