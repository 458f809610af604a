use mipsel_assembler::{assemble, Assembly};
use mipsel_simulator::config::Config;
use mipsel_simulator::{run_image, run_image_with_io, Processor};
use mipsel_types::MipsError;
use std::io::{BufRead, Write};

/// The interpreter allows far more steps than the executor's default; an
/// assembled-in-process program is trusted to be long-running.
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

/// Assemble a source stream and run it, starting at `main`, on
/// stdin/stdout.
pub fn interpret<R: BufRead>(source: R, max_steps: u64) -> Result<Processor, MipsError> {
    let assembly = assemble(source)?;
    let entry = require_main(&assembly)?;

    run_image(assembly.binary, Config::default(), max_steps, Some(entry))
}

/// `interpret` with explicit syscall I/O handles, for embedding and tests.
pub fn interpret_with_io<R: BufRead>(
    source: R,
    max_steps: u64,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
) -> Result<Processor, MipsError> {
    let assembly = assemble(source)?;
    let entry = require_main(&assembly)?;

    run_image_with_io(
        assembly.binary,
        Config::default(),
        max_steps,
        Some(entry),
        input,
        output,
    )
}

fn require_main(assembly: &Assembly) -> Result<u32, MipsError> {
    assembly
        .entry()
        .ok_or_else(|| MipsError::parse("'main' label not found in assembly", 0, ""))
}
