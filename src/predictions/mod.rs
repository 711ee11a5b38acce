//! Prediction logs
//!
//! The serving layer appends every observed `(true, predicted)` pair to a
//! per-model, per-day CSV file named `{model_name}_{YYYYMMDD}.csv` with the
//! columns `true`, `predicted`, `timestamp`. Monitoring reads them back
//! through a [`PredictionLogIndex`], an explicit `(model, date) -> file`
//! mapping built from one directory scan.

mod index;
mod log;
mod metrics;


use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use index::{LogFile, PredictionLogIndex};
pub use log::{read_entries, PredictionLog};
pub use metrics::ClassificationMetrics;

/// One observed prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    #[serde(rename = "true")]
    pub true_label: String,
    pub predicted: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

/// Timestamp layouts accepted when reading logs back. The second one is
/// what pandas writes for a `datetime64` column.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a logged timestamp, yielding `None` for anything unreadable.
/// Metrics never look at the timestamp, so a bad cell must not cost the row.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

impl PredictionLogEntry {
    pub fn new(true_label: impl Into<String>, predicted: impl Into<String>) -> Self {
        Self {
            true_label: true_label.into(),
            predicted: predicted.into(),
            timestamp: Some(chrono::Local::now().naive_local()),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.true_label == self.predicted
    }
}

/// Prediction log errors
#[derive(Debug, thiserror::Error)]
pub enum PredictionLogError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Invalid model name for a log file: {0:?}")]
    InvalidModelName(String),
}

/// Result type for prediction log operations
pub type Result<T> = std::result::Result<T, PredictionLogError>;
