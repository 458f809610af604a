use env_logger::Env;
use mipsel_interpreter::{interpret, DEFAULT_MAX_STEPS};
use mipsel_types::MipsError;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Assemble and execute a mipsel assembly program in one step. The
/// program must define a `main` label; execution starts there.
#[derive(StructOpt)]
#[structopt(name = "interp")]
struct CliArgs {
    #[structopt(parse(from_os_str))]
    file_path: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = CliArgs::from_args();

    if let Err(error) = run(&args) {
        eprintln!("Interpreter error: {}", error);
        process::exit(2);
    }
}

fn run(args: &CliArgs) -> Result<(), MipsError> {
    let file = File::open(&args.file_path)?;
    interpret(BufReader::new(file), DEFAULT_MAX_STEPS)?;

    Ok(())
}
