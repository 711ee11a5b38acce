//! Stage transition records and the archive-then-promote step
//!
//! [`apply_promotion`] is the single transition function used by every
//! tracking store. Stores call it while holding their per-model lock so the
//! archive of existing holders and the promotion of the candidate land as
//! one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stage::ModelStage;
use super::version::ModelVersion;

/// Stage transition record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    /// Model name
    pub model_name: String,
    /// Version
    pub version: u32,
    /// Previous stage
    pub from_stage: ModelStage,
    /// New stage
    pub to_stage: ModelStage,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Reason for transition
    pub reason: Option<String>,
}

/// Request to move one version into a stage
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRequest {
    pub model_name: String,
    pub version: u32,
    pub target: ModelStage,
    /// Archive every other version currently holding `target`
    pub archive_existing: bool,
    pub reason: Option<String>,
}

impl PromotionRequest {
    pub fn new(model_name: &str, version: u32, target: ModelStage) -> Self {
        Self {
            model_name: model_name.to_string(),
            version,
            target,
            archive_existing: true,
            reason: None,
        }
    }

    pub fn keep_existing(mut self) -> Self {
        self.archive_existing = false;
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

/// Rejections from the transition function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Version not found: {0} v{1}")]
    VersionNotFound(String, u32),

    #[error("Invalid stage transition from {from} to {to}")]
    Invalid { from: ModelStage, to: ModelStage },
}

/// Archive current holders of the target stage, then promote the candidate.
///
/// Validates everything before mutating, so a rejected request leaves
/// `versions` untouched. Returns the transitions applied, archives first.
pub fn apply_promotion(
    versions: &mut [ModelVersion],
    request: &PromotionRequest,
) -> Result<Vec<StageTransition>, TransitionError> {
    let candidate = versions
        .iter()
        .position(|v| v.model_name == request.model_name && v.version == request.version)
        .ok_or_else(|| {
            TransitionError::VersionNotFound(request.model_name.clone(), request.version)
        })?;

    let from = versions[candidate].stage;
    if !from.can_transition_to(request.target) {
        return Err(TransitionError::Invalid { from, to: request.target });
    }

    let now = Utc::now();
    let mut applied = Vec::new();

    if request.archive_existing && request.target.is_exclusive() {
        for (idx, holder) in versions.iter_mut().enumerate() {
            if idx == candidate || holder.stage != request.target {
                continue;
            }
            applied.push(StageTransition {
                model_name: holder.model_name.clone(),
                version: holder.version,
                from_stage: holder.stage,
                to_stage: ModelStage::Archived,
                timestamp: now,
                reason: Some(format!("superseded by v{} in {}", request.version, request.target)),
            });
            holder.stage = ModelStage::Archived;
            holder.stage_updated_at = Some(now);
        }
    }

    if from != request.target {
        let target = &mut versions[candidate];
        target.stage = request.target;
        target.stage_updated_at = Some(now);
        applied.push(StageTransition {
            model_name: request.model_name.clone(),
            version: request.version,
            from_stage: from,
            to_stage: request.target,
            timestamp: now,
            reason: request.reason.clone(),
        });
    }

    Ok(applied)
}
