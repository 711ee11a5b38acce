//! Drift Detection Module
//!
//! Decides from evidence whether reference assumptions still hold and emits
//! the statistic and p-value behind every verdict:
//! - Kolmogorov-Smirnov test (numeric features)
//! - Chi-square homogeneity test (categorical features)
//! - Performance drop of the latest day against the mean of earlier days
//!   (model drift, one-sided)

mod dataset;
mod detector;
mod statistical;
mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use crate::predictions::PredictionLogError;
use crate::report::ReportError;

pub use dataset::{Cell, Dataset};
pub use detector::DriftDetector;
pub use types::{
    DailyMetrics, DriftReport, DriftReportDocument, DriftSummary, DriftTest, ModelDriftReport,
};

// Re-export statistical functions for testing/advanced use
pub use statistical::{
    chi_square_homogeneity, chi_square_p_value, ks_p_value, ks_statistic, ks_two_sample,
};

/// Drift detection errors
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    #[error("I/O error reading {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Malformed dataset {path}: {source}")]
    Dataset { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    PredictionLog(#[from] PredictionLogError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type for drift operations
pub type Result<T> = std::result::Result<T, DriftError>;
