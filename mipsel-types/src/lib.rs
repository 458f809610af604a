pub mod constants;
pub mod error;
pub mod image;
pub mod instruction;

pub use {error::MipsError, instruction::Instruction};
