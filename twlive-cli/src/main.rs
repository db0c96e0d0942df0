mod cli;
mod error;
mod output;

use std::io::IsTerminal;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use twitch_live::{LiveChecker, ProbeResult};

use crate::{
    cli::Args,
    error::{AppError, Result},
    output::OutputManager,
};

const EXIT_LIVE: i32 = 0;
/// Offline, unknown and failed checks all share this code.
const EXIT_NOT_LIVE: i32 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let code = match run(&args).await {
        Ok(result) => {
            if !args.quiet {
                let output = OutputManager::new(std::io::stdout().is_terminal());
                println!("{}", output.format_result(&args.url, &result));
            }
            if result.is_live() {
                EXIT_LIVE
            } else {
                EXIT_NOT_LIVE
            }
        }
        Err(e) => {
            if !args.quiet {
                let output = OutputManager::new(std::io::stderr().is_terminal());
                eprintln!("{}", output.format_error(&e));
            }
            EXIT_NOT_LIVE
        }
    };
    process::exit(code);
}

async fn run(args: &Args) -> Result<ProbeResult> {
    init_logging(args.verbose, args.quiet)?;
    debug!("{:?}", args);

    let checker = LiveChecker::new(&args.check_config())?;
    Ok(checker.check(&args.url).await?)
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_level(verbose))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
