use crate::config::Config;
use crate::memory::Memory;
use crate::registers::Registers;
use mipsel_types::image::Image;
use mipsel_types::instruction::Instruction;
use mipsel_types::MipsError;
use std::io;
use std::io::{BufRead, BufReader, Write};

/// A mipsel processor: register file, memory, program counter, and the
/// I/O handles the syscalls talk to.
pub struct Processor {
    pub registers: Registers,
    pub memory: Memory,
    pub(crate) program_counter: u32,
    pub running: bool,
    pub(crate) input: Box<dyn BufRead>,
    pub(crate) output: Box<dyn Write>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("registers", &self.registers)
            .field("memory", &self.memory)
            .field("program_counter", &self.program_counter)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Processor {
    pub fn new(config: Config) -> Self {
        Self::with_io(
            config,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(config: Config, input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Processor {
            registers: Registers::new(),
            memory: Memory::new(config.memory_size),
            program_counter: 0,
            running: true,
            input,
            output,
        }
    }

    /// Copy a program image to address 0.
    pub fn load_image(&mut self, data: &[u8]) -> Result<(), MipsError> {
        self.memory.load(0, data)
    }

    pub fn set_entry(&mut self, address: u32) {
        self.program_counter = address;
    }

    pub fn program_counter(&self) -> u32 {
        self.program_counter
    }

    /// Fetch, decode, and execute one instruction.
    pub fn step(&mut self) -> Result<(), MipsError> {
        let pc = self.program_counter;

        if !self.memory.is_valid(pc, 4) {
            return Err(MipsError::PcOutOfBounds(pc));
        }

        let word = self.memory.read_word(pc)?;
        let instruction = Instruction::decode(word)?;
        debug!("pc=0x{:08x} word=0x{:08x}  {}", pc, word, instruction);

        self.execute(instruction)?;

        // Fall-through advance. Handlers that transfer control set the PC
        // themselves; everything else leaves it alone and lands here.
        if self.program_counter == pc {
            self.program_counter = pc.wrapping_add(4);
        }

        Ok(())
    }

    pub fn execute(&mut self, instruction: Instruction) -> Result<(), MipsError> {
        match instruction {
            Instruction::R {
                rs,
                rt,
                rd,
                shamt,
                funct,
            } => {
                self.execute_r_type(rs, rt, rd, shamt, funct);
                Ok(())
            }
            Instruction::I {
                op,
                rs,
                rt,
                immediate,
            } => self.execute_i_type(op, rs, rt, immediate),
            Instruction::J { op, address } => {
                self.execute_j_type(op, address);
                Ok(())
            }
        }
    }

    /// Step until a trap stops the machine. Fails once `max_steps`
    /// instructions have run without one.
    pub fn run(&mut self, max_steps: u64) -> Result<u64, MipsError> {
        let mut steps = 0;

        while self.running {
            if steps >= max_steps {
                return Err(MipsError::StepLimit(max_steps));
            }
            steps += 1;
            self.step()?;
        }

        Ok(steps)
    }
}

/// Load a binary image and run it to completion on stdin/stdout.
///
/// The image may carry the optional `"MIPS"` header; the start PC is the
/// override if given, else the header entry, else 0.
pub fn run_image(
    bytes: Vec<u8>,
    config: Config,
    max_steps: u64,
    start_pc: Option<u32>,
) -> Result<Processor, MipsError> {
    run_on(Processor::new(config), bytes, max_steps, start_pc)
}

/// `run_image` with explicit I/O handles, for embedding and tests.
pub fn run_image_with_io(
    bytes: Vec<u8>,
    config: Config,
    max_steps: u64,
    start_pc: Option<u32>,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
) -> Result<Processor, MipsError> {
    run_on(
        Processor::with_io(config, input, output),
        bytes,
        max_steps,
        start_pc,
    )
}

fn run_on(
    mut processor: Processor,
    bytes: Vec<u8>,
    max_steps: u64,
    start_pc: Option<u32>,
) -> Result<Processor, MipsError> {
    let image = Image::from_bytes(bytes);

    processor.load_image(&image.body)?;
    processor.set_entry(start_pc.or(image.entry).unwrap_or(0));
    processor.run(max_steps)?;

    Ok(processor)
}
