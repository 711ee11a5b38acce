//! Registry error types

use thiserror::Error;

use super::stage::ModelStage;
use crate::tracking::StoreError;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Version not found: {0} v{1}")]
    VersionNotFound(String, u32),

    #[error("Invalid stage transition from {0} to {1}")]
    InvalidTransition(ModelStage, ModelStage),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Invalid metrics: {0}")]
    InvalidMetrics(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Tracking store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
