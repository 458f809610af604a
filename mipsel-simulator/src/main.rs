use env_logger::Env;
use mipsel_simulator::config::Config;
use mipsel_simulator::run_image;
use mipsel_types::MipsError;
use std::fs;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Execute a flat mipsel binary image.
#[derive(StructOpt)]
#[structopt(name = "exe")]
struct CliArgs {
    /// Print a per-step trace to stderr
    #[structopt(short = "v", long)]
    verbose: bool,

    /// Maximum number of instructions to execute
    #[structopt(short = "m", long = "max-steps", default_value = "100000")]
    max_steps: u64,

    /// Start PC (decimal or 0x hex), overriding any image header
    #[structopt(short = "s", long = "start", parse(try_from_str = parse_address))]
    start: Option<u32>,

    #[structopt(parse(from_os_str))]
    file_path: PathBuf,
}

fn parse_address(value: &str) -> Result<u32, ParseIntError> {
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse()
    }
}

fn main() {
    let args = CliArgs::from_args();
    let default_filter = if args.verbose {
        "mipsel_simulator=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(error) = run(&args) {
        eprintln!("Executor error: {}", error);
        process::exit(2);
    }
}

fn run(args: &CliArgs) -> Result<(), MipsError> {
    let file_data = fs::read(&args.file_path)?;
    run_image(file_data, Config::default(), args.max_steps, args.start)?;

    Ok(())
}
