//! Tracking Store boundary
//!
//! Durable key/value store of runs (metric/parameter bags) and model
//! versions. The registry is handed a store explicitly at construction so
//! tests can substitute [`InMemoryStore`] for the file-backed
//! [`JsonFileStore`].
//!
//! # Architecture
//!
//! - **`Run`**: immutable record of one registration event
//! - **`TrackingStore`**: pluggable persistence; every stage mutation goes
//!   through [`TrackingStore::promote`], which the store applies atomically
//!   per model
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use vigilar::tracking::{InMemoryStore, Run, TrackingStore};
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let metrics = BTreeMap::from([("accuracy".to_string(), 0.91)]);
//! let run = Run::new("intent_classifier_20260101_0900", metrics, BTreeMap::new(), "models/intent");
//! store.save_run(&run)?;
//!
//! let mv = store.create_model_version("intent_classifier", &run.run_id, &run.artifact_uri)?;
//! assert_eq!(mv.version, 1);
//! # Ok(())
//! # }
//! ```

pub mod storage;


use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::{ModelVersion, PromotionRequest, StageTransition, TransitionError};

pub use storage::{InMemoryStore, JsonFileStore};

/// Immutable record of one training/registration event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier for the run
    pub run_id: String,
    /// Human-readable name, `{model}_{YYYYMMDD_HHMM}` for registrations
    pub run_name: String,
    /// Metric name -> value
    pub metrics: BTreeMap<String, f64>,
    /// Parameter name -> string-encoded value
    pub params: BTreeMap<String, String>,
    /// Artifact location logged with the run
    pub artifact_uri: String,
    pub start_time: DateTime<Utc>,
}

impl Run {
    pub fn new(
        run_name: &str,
        metrics: BTreeMap<String, f64>,
        params: BTreeMap<String, String>,
        artifact_uri: &str,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().simple().to_string(),
            run_name: run_name.to_string(),
            metrics,
            params,
            artifact_uri: artifact_uri.to_string(),
            start_time: Utc::now(),
        }
    }
}

/// Errors from tracking store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Result alias for tracking store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reachability snapshot returned by [`TrackingStore::ping`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub backend: String,
    pub models: usize,
}

/// Trait for tracking store backends
///
/// Implementations must be safe to share across threads and must apply
/// [`promote`](TrackingStore::promote) as one indivisible step per model.
pub trait TrackingStore: Send + Sync {
    /// Persist a run
    fn save_run(&self, run: &Run) -> StoreResult<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> StoreResult<Option<Run>>;

    /// Create the next version of `model_name` in stage `None`
    fn create_model_version(
        &self,
        model_name: &str,
        run_id: &str,
        artifact_uri: &str,
    ) -> StoreResult<ModelVersion>;

    /// Get one version of a model
    fn get_model_version(&self, model_name: &str, version: u32) -> StoreResult<Option<ModelVersion>>;

    /// All versions of a model, ascending; empty for unknown models
    fn list_model_versions(&self, model_name: &str) -> StoreResult<Vec<ModelVersion>>;

    /// Names of all registered models, sorted
    fn list_model_names(&self) -> StoreResult<Vec<String>>;

    /// Archive-then-promote under the model's exclusive lock
    fn promote(&self, request: &PromotionRequest) -> StoreResult<Vec<StageTransition>>;

    /// Stage transitions recorded for a model, oldest first
    fn transition_history(&self, model_name: &str) -> StoreResult<Vec<StageTransition>>;

    /// Cheap reachability check
    fn ping(&self) -> StoreResult<StoreStatus>;
}

/// Reject names that cannot be used as a single path component
pub(crate) fn validate_model_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
