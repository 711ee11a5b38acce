//! Registry service over an injected tracking store

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;

use super::artifact::{ArtifactResolver, DefaultArtifactResolver};
use super::comparison::{VersionComparison, VersionSnapshot};
use super::error::{RegistryError, Result};
use super::policy::PromotionPolicy;
use super::report::{ModelInfo, RegisteredModel, RegistryReport, VersionSummary};
use super::stage::ModelStage;
use super::transition::{PromotionRequest, StageTransition, TransitionError};
use super::version::ModelVersion;
use crate::report::{ReportKind, ReportWriter};
use crate::tracking::{Run, StoreError, TrackingStore};

type StageKey = (String, ModelStage);

/// Single writer of stage transitions
///
/// Conflicting promotions within this process are serialised per
/// `(model_name, stage)`; the store applies each archive-then-promote as one
/// step so concurrent processes sharing the store stay consistent too.
pub struct ModelRegistry {
    store: Arc<dyn TrackingStore>,
    resolver: Arc<dyn ArtifactResolver>,
    stage_locks: Mutex<HashMap<StageKey, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry").finish_non_exhaustive()
    }
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn TrackingStore>) -> Self {
        Self {
            store,
            resolver: Arc::new(DefaultArtifactResolver),
            stage_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the artifact resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn ArtifactResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn store(&self) -> &Arc<dyn TrackingStore> {
        &self.store
    }

    /// Record a run for `metrics`/`metadata` and create a new version in
    /// stage `None` pointing at it.
    pub fn register_model(
        &self,
        model_name: &str,
        artifact_ref: &str,
        metrics: &HashMap<String, f64>,
        metadata: &HashMap<String, String>,
    ) -> Result<u32> {
        if metrics.is_empty() {
            return Err(RegistryError::InvalidMetrics("metrics mapping is empty".to_string()));
        }
        if let Some((name, value)) = metrics.iter().find(|(_, v)| !v.is_finite()) {
            return Err(RegistryError::InvalidMetrics(format!("metric '{name}' is {value}")));
        }
        let artifact_uri = self.resolver.resolve(artifact_ref)?;

        let run_name = format!("{model_name}_{}", Local::now().format("%Y%m%d_%H%M"));
        let run = Run::new(
            &run_name,
            metrics.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            metadata.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            &artifact_uri,
        );
        self.store.save_run(&run)?;
        let mv = self.store.create_model_version(model_name, &run.run_id, &artifact_uri)?;

        tracing::info!(model = model_name, version = mv.version, run_id = %run.run_id, "Registered model version");
        Ok(mv.version)
    }

    /// Apply a promotion request, returning every transition it caused
    pub fn try_promote(&self, request: &PromotionRequest) -> Result<Vec<StageTransition>> {
        let lock = self.stage_lock(&request.model_name, request.target);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let applied = self.store.promote(request).map_err(RegistryError::from_store)?;
        for t in &applied {
            if t.to_stage == ModelStage::Archived && t.version != request.version {
                tracing::info!(model = %t.model_name, version = t.version, from = %t.from_stage, "Archived model version");
            } else {
                tracing::info!(model = %t.model_name, version = t.version, from = %t.from_stage, to = %t.to_stage, "Promoted model version");
            }
        }
        Ok(applied)
    }

    /// Move `version` into `target`, archiving current holders first when
    /// `archive_existing` is set. Returns `false` on any failure.
    pub fn promote_model(
        &self,
        model_name: &str,
        version: u32,
        target: ModelStage,
        archive_existing: bool,
    ) -> bool {
        let mut request = PromotionRequest::new(model_name, version, target);
        if !archive_existing {
            request = request.keep_existing();
        }
        match self.try_promote(&request) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(model = model_name, version, target = %target, error = %e, "Promotion failed");
                false
            }
        }
    }

    /// Latest version currently in `stage`, joined with its run
    pub fn get_model_info(&self, model_name: &str, stage: ModelStage) -> Result<Option<ModelInfo>> {
        let Some(mv) = self.latest_in_stage(model_name, stage)? else {
            tracing::debug!(model = model_name, stage = %stage, "No version in stage");
            return Ok(None);
        };
        let run = self.load_run_for(&mv)?;
        Ok(Some(ModelInfo {
            model_uri: format!("models:/{}/{}", mv.model_name, stage),
            name: mv.model_name,
            version: mv.version,
            stage: mv.stage,
            run_id: mv.run_id,
            artifact_uri: mv.artifact_uri,
            metrics: run.as_ref().map(|r| r.metrics.clone()).unwrap_or_default(),
            params: run.map(|r| r.params).unwrap_or_default(),
            created_at: mv.created_at,
        }))
    }

    /// Metric deltas `version2 - version1` over metrics both versions have
    pub fn compare_models(
        &self,
        model_name: &str,
        version1: u32,
        version2: u32,
    ) -> Result<Option<VersionComparison>> {
        let (Some(a), Some(b)) = (self.snapshot(model_name, version1)?, self.snapshot(model_name, version2)?)
        else {
            tracing::warn!(model = model_name, version1, version2, "Cannot compare: version not found");
            return Ok(None);
        };
        Ok(Some(VersionComparison::between(model_name, a, b)))
    }

    /// All models with their versions; with a stage filter, only matching
    /// versions are kept and models left with none are omitted.
    pub fn list_models(&self, stage: Option<ModelStage>) -> Result<Vec<RegisteredModel>> {
        let mut models = Vec::new();
        for name in self.store.list_model_names()? {
            let versions: Vec<VersionSummary> = self
                .store
                .list_model_versions(&name)?
                .iter()
                .filter(|v| stage.is_none_or(|s| v.stage == s))
                .map(VersionSummary::from)
                .collect();
            if stage.is_some() && versions.is_empty() {
                continue;
            }
            models.push(RegisteredModel { name, versions });
        }
        Ok(models)
    }

    /// Promote the newest unassigned version to Staging if it meets every
    /// threshold of `policy`. Production promotion is always manual.
    pub fn auto_promote_model(&self, model_name: &str, policy: &PromotionPolicy) -> bool {
        match self.try_auto_promote(model_name, policy) {
            Ok(promoted) => promoted,
            Err(e) => {
                tracing::warn!(model = model_name, error = %e, "Auto-promotion failed");
                false
            }
        }
    }

    fn try_auto_promote(&self, model_name: &str, policy: &PromotionPolicy) -> Result<bool> {
        let Some(candidate) = self.latest_in_stage(model_name, ModelStage::None)? else {
            tracing::info!(model = model_name, "No unassigned version to auto-promote");
            return Ok(false);
        };
        let metrics = self.load_run_for(&candidate)?.map(|r| r.metrics).unwrap_or_default();

        let check = policy.check(&metrics);
        if !check.passed {
            tracing::info!(
                model = model_name,
                version = candidate.version,
                failed_metric = check.failed_metric.as_deref().unwrap_or_default(),
                reason = check.reason.as_deref().unwrap_or_default(),
                "Auto-promotion rejected"
            );
            return Ok(false);
        }

        let request = PromotionRequest::new(model_name, candidate.version, ModelStage::Staging)
            .with_reason("auto-promotion thresholds met");
        self.try_promote(&request)?;
        Ok(true)
    }

    /// Snapshot of every model plus per-stage counts
    pub fn build_report(&self) -> Result<RegistryReport> {
        Ok(RegistryReport::new(self.list_models(None)?))
    }

    /// Persist [`build_report`](Self::build_report) as a new artifact
    pub fn generate_report(&self, writer: &ReportWriter) -> crate::Result<PathBuf> {
        let report = self.build_report()?;
        let path = writer.write(ReportKind::ModelRegistry, &report)?;
        tracing::info!(path = %path.display(), models = report.summary.total_models, "Registry report written");
        Ok(path)
    }

    pub fn transition_history(&self, model_name: &str) -> Result<Vec<StageTransition>> {
        Ok(self.store.transition_history(model_name)?)
    }

    fn latest_in_stage(&self, model_name: &str, stage: ModelStage) -> Result<Option<ModelVersion>> {
        Ok(self
            .store
            .list_model_versions(model_name)?
            .into_iter()
            .filter(|v| v.stage == stage)
            .max_by_key(|v| v.version))
    }

    fn load_run_for(&self, mv: &ModelVersion) -> Result<Option<Run>> {
        let run = self.store.load_run(&mv.run_id)?;
        if run.is_none() {
            tracing::warn!(model = %mv.model_name, version = mv.version, run_id = %mv.run_id, "Run missing for version");
        }
        Ok(run)
    }

    fn snapshot(&self, model_name: &str, version: u32) -> Result<Option<VersionSnapshot>> {
        let Some(mv) = self.store.get_model_version(model_name, version)? else {
            return Ok(None);
        };
        let metrics: BTreeMap<String, f64> =
            self.load_run_for(&mv)?.map(|r| r.metrics).unwrap_or_default();
        Ok(Some(VersionSnapshot { version, metrics, created_at: mv.created_at }))
    }

    fn stage_lock(&self, model_name: &str, stage: ModelStage) -> Arc<Mutex<()>> {
        let mut locks = self.stage_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry((model_name.to_string(), stage)).or_default())
    }
}

impl RegistryError {
    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Transition(TransitionError::VersionNotFound(name, version)) => {
                RegistryError::VersionNotFound(name, version)
            }
            StoreError::Transition(TransitionError::Invalid { from, to }) => {
                RegistryError::InvalidTransition(from, to)
            }
            other => RegistryError::Store(other),
        }
    }
}
