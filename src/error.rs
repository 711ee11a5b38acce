//! Crate-level error taxonomy
//!
//! Component errors convert into [`Error`] so the command surface can decide
//! exit codes in one place. Expected "no data" conditions never reach this
//! type; they surface as `None`/`false` from the component APIs.

use thiserror::Error;

use crate::config::ConfigError;
use crate::drift::DriftError;
use crate::monitor::AlertError;
use crate::predictions::PredictionLogError;
use crate::registry::RegistryError;
use crate::report::ReportError;
use crate::tracking::StoreError;

/// Top-level error for vigilar operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error(transparent)]
    PredictionLog(#[from] PredictionLogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Whether this error should abort startup with a configuration exit code
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result alias for vigilar operations
pub type Result<T> = std::result::Result<T, Error>;
