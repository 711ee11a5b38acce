//! Validation error types

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid threshold {name}: {value} (must be > 0.0 and <= 1.0)")]
    InvalidThreshold { name: String, value: f64 },

    #[error("Invalid {0}: must be > 0")]
    ZeroValue(&'static str),

    #[error("Invalid daily_drift_check_at: {0:?} (expected HH:MM)")]
    InvalidTimeOfDay(String),

    #[error("Unsupported alert channel type: {0:?} (must be one of: webhook, slack, log, file)")]
    UnknownChannelType(String),

    #[error("Alert channel {0:?} has an empty destination")]
    EmptyDestination(String),

    #[error("No models configured for monitoring")]
    NoModels,

    #[error("Invalid health check URL: {0:?}")]
    InvalidHealthUrl(String),
}
