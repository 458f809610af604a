use env_logger::Env;
use mipsel_assembler::{assemble, Assembly};
use mipsel_types::MipsError;
use std::fs;
use std::fs::File;
use std::io;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Assemble mipsel assembly into a flat binary image.
#[derive(StructOpt)]
#[structopt(name = "asm")]
struct CliArgs {
    /// Input assembly file; stdin when omitted
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Output binary file; stdout when omitted
    #[structopt(parse(from_os_str))]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = CliArgs::from_args();

    let assembly = match read_and_assemble(&args) {
        Ok(assembly) => assembly,
        Err(error) => {
            eprintln!("Assembler error: {}", error);
            process::exit(1);
        }
    };

    if let Err(error) = write_output(&args, &assembly.binary) {
        eprintln!("Assembler error: {}", error);
        process::exit(2);
    }
}

fn read_and_assemble(args: &CliArgs) -> Result<Assembly, MipsError> {
    match &args.input {
        Some(path) => assemble(BufReader::new(File::open(path)?)),
        None => {
            let stdin = io::stdin();
            let locked = stdin.lock();
            assemble(locked)
        }
    }
}

fn write_output(args: &CliArgs, binary: &[u8]) -> io::Result<()> {
    match &args.output {
        Some(path) => fs::write(path, binary),
        None => {
            let stdout = io::stdout();
            let mut locked = stdout.lock();
            locked.write_all(binary)?;
            locked.flush()
        }
    }
}
