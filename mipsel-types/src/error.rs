use std::io;
use thiserror::Error;

/// Every failure the toolchain can report.
#[derive(Debug, Error)]
pub enum MipsError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("memory access violation at address 0x{address:08x} (size {size})")]
    MemoryAccess { address: u32, size: u32 },

    #[error("program counter out of bounds at 0x{0:08x}")]
    PcOutOfBounds(u32),

    #[error("reached maximum instruction count limit ({0})")]
    StepLimit(u64),

    #[error("unknown syscall: {0}")]
    UnknownSyscall(u16),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MipsError {
    /// Build a parse error pointing at an offending source line.
    pub fn parse(message: impl Into<String>, line_number: usize, line: &str) -> Self {
        let message = message.into();

        if line.is_empty() {
            MipsError::Parse(message)
        } else {
            MipsError::Parse(format!("{} in line {}: {}", message, line_number, line))
        }
    }
}
