//! CLI module for vigilar
//!
//! This module contains all CLI command handlers and utilities.

mod commands;
mod logging;

pub use commands::{run_command, CommandOutcome};
pub use logging::{init_logging, LogLevel};

// Re-export Cli from config for convenience
pub use crate::config::Cli;
