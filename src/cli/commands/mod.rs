//! CLI command implementations

mod drift;
mod monitor;
mod registry;


use crate::cli::LogLevel;
use crate::config::{Cli, Command, MonitoringConfig};

/// How a successful command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// The drift command found drift; the binary exits 1
    DriftDetected,
}

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> crate::Result<CommandOutcome> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    let config = MonitoringConfig::load(&cli.config)?;
    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    match cli.command {
        Command::Monitor(args) => monitor::run_monitor(config, args, level),
        Command::Drift(args) => drift::run_drift(&config, args, level),
        Command::Register(args) => registry::run_register(&config, args, level),
        Command::Promote(args) => registry::run_promote(&config, args, level),
        Command::AutoPromote(args) => registry::run_auto_promote(&config, args, level),
        Command::Info(args) => registry::run_info(&config, args, level),
        Command::Compare(args) => registry::run_compare(&config, args, level),
        Command::List(args) => registry::run_list(&config, args, level),
        Command::Report => registry::run_report(&config, level),
    }
}
