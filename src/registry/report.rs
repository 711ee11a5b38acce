//! Read-side views produced by the registry

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::ModelStage;
use super::version::ModelVersion;

/// A version joined with the metrics and params of its run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: u32,
    pub stage: ModelStage,
    pub run_id: String,
    pub artifact_uri: String,
    /// `models:/{name}/{stage}`
    pub model_uri: String,
    pub metrics: BTreeMap<String, f64>,
    pub params: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Short form of a version used in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub version: u32,
    pub stage: ModelStage,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ModelVersion> for VersionSummary {
    fn from(mv: &ModelVersion) -> Self {
        Self { version: mv.version, stage: mv.stage, run_id: mv.run_id.clone(), created_at: mv.created_at }
    }
}

/// A model and (a possibly filtered subset of) its versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModel {
    pub name: String,
    pub versions: Vec<VersionSummary>,
}

impl RegisteredModel {
    pub fn has_stage(&self, stage: ModelStage) -> bool {
        self.versions.iter().any(|v| v.stage == stage)
    }
}

/// Counts over all registered models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySummary {
    pub total_models: usize,
    /// Models with a version in Production
    pub production_models: usize,
    /// Models with a version in Staging
    pub staging_models: usize,
    /// Version count per stage
    pub versions_by_stage: BTreeMap<ModelStage, usize>,
}

impl RegistrySummary {
    pub fn from_models(models: &[RegisteredModel]) -> Self {
        let mut versions_by_stage: BTreeMap<ModelStage, usize> =
            ModelStage::ALL.iter().map(|s| (*s, 0)).collect();
        for version in models.iter().flat_map(|m| &m.versions) {
            *versions_by_stage.entry(version.stage).or_default() += 1;
        }
        Self {
            total_models: models.len(),
            production_models: models.iter().filter(|m| m.has_stage(ModelStage::Production)).count(),
            staging_models: models.iter().filter(|m| m.has_stage(ModelStage::Staging)).count(),
            versions_by_stage,
        }
    }
}

/// Snapshot persisted as `model_registry_report_*.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryReport {
    pub timestamp: DateTime<Utc>,
    pub models: Vec<RegisteredModel>,
    pub summary: RegistrySummary,
}

impl RegistryReport {
    pub fn new(models: Vec<RegisteredModel>) -> Self {
        let summary = RegistrySummary::from_models(&models);
        Self { timestamp: Utc::now(), models, summary }
    }
}
