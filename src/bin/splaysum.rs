use log::{error, Level};
use splaysum::run;
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Read commands from this file instead of stdin.
    input: Option<PathBuf>,

    /// Log more to stderr. Repeat for trace output.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Maps the number of `--verbose` flags to a log level.
fn verbosity_level(num: u8) -> Level {
    match num {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        3.. => Level::Trace,
    }
}

fn init_logger(verbosity: u8) {
    env_logger::Builder::from_default_env()
        .filter(None, verbosity_level(verbosity).to_level_filter())
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    let r: Box<dyn BufRead> = match &args.input {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                error!("cannot open {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(stdin().lock()),
    };
    let w = BufWriter::new(stdout().lock());
    match run(r, w) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
