//! Vigilar CLI
//!
//! # Usage
//!
//! ```bash
//! # One monitoring cycle, then exit
//! vigilar monitor --mode once
//!
//! # Monitoring report every check interval, drift check daily
//! vigilar monitor --mode scheduled --config config/mlops_config.yaml
//!
//! # Drift check; exits 1 when drift is found
//! vigilar drift --model intent_classifier --reference-data ref.csv --current-data cur.csv
//!
//! # Registry
//! vigilar register --model intent_classifier --artifact s3://models/intent --metric accuracy=0.88
//! vigilar promote --model intent_classifier --version 1 --stage Production
//! ```

use clap::Parser;
use std::process::ExitCode;
use vigilar::cli::{init_logging, run_command, Cli, CommandOutcome, LogLevel};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LogLevel::from_flags(cli.verbose, cli.quiet), cli.log_format);

    match run_command(cli) {
        Ok(CommandOutcome::Completed) => ExitCode::SUCCESS,
        Ok(CommandOutcome::DriftDetected) => ExitCode::FAILURE,
        Err(e) if e.is_configuration() => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
