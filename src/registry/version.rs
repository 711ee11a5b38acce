//! Model version records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::ModelStage;

/// One trained artifact of a named model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Model name
    pub model_name: String,
    /// Version number (monotonically increasing per model)
    pub version: u32,
    /// Current stage
    pub stage: ModelStage,
    /// Run recorded when the version was registered
    pub run_id: String,
    /// Resolved location of the model artifacts
    pub artifact_uri: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last stage change
    pub stage_updated_at: Option<DateTime<Utc>>,
}

impl ModelVersion {
    /// Create a new version in stage `None`
    pub fn new(model_name: &str, version: u32, run_id: &str, artifact_uri: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            version,
            stage: ModelStage::None,
            run_id: run_id.to_string(),
            artifact_uri: artifact_uri.to_string(),
            created_at: Utc::now(),
            stage_updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_version_new_starts_unassigned() {
        let mv = ModelVersion::new("intent_classifier", 3, "run-7", "models/intent");
        assert_eq!(mv.model_name, "intent_classifier");
        assert_eq!(mv.version, 3);
        assert_eq!(mv.stage, ModelStage::None);
        assert_eq!(mv.run_id, "run-7");
        assert!(mv.stage_updated_at.is_none());
    }
}
