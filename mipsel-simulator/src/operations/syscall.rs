use crate::Processor;
use mipsel_types::constants::{
    REG_A0, REG_V0, SYSCALL_EXIT, SYSCALL_PRINT_CHARACTER, SYSCALL_PRINT_INT, SYSCALL_PRINT_STRING,
    SYSCALL_READ_CHARACTER, SYSCALL_READ_INT,
};
use mipsel_types::MipsError;
use std::io;
use std::io::{BufRead, Read, Write};

impl Processor {
    /// Run the syscall selected by the trap immediate, then stop the
    /// machine: every trap, `exit` or not, is the run's termination
    /// signal.
    pub(crate) fn op_trap(&mut self, immediate: u16) -> Result<(), MipsError> {
        debug!("trap {}", immediate);

        match immediate {
            SYSCALL_PRINT_INT => self.syscall_print_int()?,
            SYSCALL_PRINT_CHARACTER => self.syscall_print_character()?,
            SYSCALL_PRINT_STRING => self.syscall_print_string()?,
            SYSCALL_READ_INT => self.syscall_read_int()?,
            SYSCALL_READ_CHARACTER => self.syscall_read_character()?,
            SYSCALL_EXIT => {}
            unknown => return Err(MipsError::UnknownSyscall(unknown)),
        }

        self.running = false;
        Ok(())
    }

    /// Write $a0 as a signed decimal integer
    fn syscall_print_int(&mut self) -> Result<(), MipsError> {
        let value = self.registers.get(REG_A0) as i32;
        write!(self.output, "{}", value)?;
        self.output.flush()?;
        Ok(())
    }

    /// Write the low byte of $a0
    fn syscall_print_character(&mut self) -> Result<(), MipsError> {
        let byte = self.registers.get(REG_A0) as u8;
        self.output.write_all(&[byte])?;
        self.output.flush()?;
        Ok(())
    }

    /// Write bytes starting at the address in $a0 up to (not including)
    /// the first NUL. Walking out of memory is a memory-access error.
    fn syscall_print_string(&mut self) -> Result<(), MipsError> {
        let mut address = self.registers.get(REG_A0);

        loop {
            let byte = self.memory.read_byte(address)?;
            if byte == 0 {
                break;
            }
            self.output.write_all(&[byte])?;
            address = address.wrapping_add(1);
        }

        self.output.flush()?;
        Ok(())
    }

    /// Read a signed decimal integer into $v0
    fn syscall_read_int(&mut self) -> Result<(), MipsError> {
        let token = self.read_token()?;
        let value: i32 = token.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid integer on input: {}", token),
            )
        })?;
        self.registers.set(REG_V0, value as u32);
        Ok(())
    }

    /// Read one byte into $v0
    fn syscall_read_character(&mut self) -> Result<(), MipsError> {
        let mut byte = [0u8; 1];
        self.input.read_exact(&mut byte)?;
        self.registers.set(REG_V0, byte[0] as u32);
        Ok(())
    }

    /// Skip leading ASCII whitespace and consume one whitespace-delimited
    /// token from the input, the way a formatted stream read would.
    fn read_token(&mut self) -> Result<String, MipsError> {
        let mut token = Vec::new();

        loop {
            let (consumed, done) = {
                let buffer = self.input.fill_buf()?;
                if buffer.is_empty() {
                    break;
                }

                let mut consumed = 0;
                let mut done = false;
                for &byte in buffer {
                    if byte.is_ascii_whitespace() {
                        if token.is_empty() {
                            consumed += 1;
                            continue;
                        }
                        done = true;
                        break;
                    }
                    token.push(byte);
                    consumed += 1;
                }
                (consumed, done)
            };

            self.input.consume(consumed);
            if done {
                break;
            }
        }

        if token.is_empty() {
            return Err(MipsError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "expected an integer on input",
            )));
        }

        String::from_utf8(token).map_err(|error| {
            MipsError::Io(io::Error::new(io::ErrorKind::InvalidData, error))
        })
    }
}
