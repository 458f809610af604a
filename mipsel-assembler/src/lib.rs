pub mod ast;
mod emit;
mod layout;
mod lower;
mod parser;
mod string_unescape;

pub use layout::{lay_out, Layout, Section};
pub use parser::{parse_program, parse_str};

use mipsel_types::MipsError;
use std::collections::HashMap;
use std::io::BufRead;

/// The product of assembling a source file: the flat binary image (text
/// block followed by data block) and the resolved label table.
#[derive(Debug)]
pub struct Assembly {
    pub binary: Vec<u8>,
    pub labels: HashMap<String, u32>,
    pub text_size: u32,
}

impl Assembly {
    /// The address of the `main` label, if the program defines one.
    pub fn entry(&self) -> Option<u32> {
        self.labels.get("main").copied()
    }
}

/// Assemble a source stream into a binary image.
pub fn assemble<R: BufRead>(input: R) -> Result<Assembly, MipsError> {
    let program = parser::parse_program(input)?;
    let layout = layout::lay_out(program);
    let binary = emit::emit(&layout)?;

    Ok(Assembly {
        binary,
        labels: layout.labels,
        text_size: layout.text_size,
    })
}

pub fn assemble_str(source: &str) -> Result<Assembly, MipsError> {
    assemble(source.as_bytes())
}
