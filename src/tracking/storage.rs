//! Tracking store backends
//!
//! Provides an in-memory store for tests and a JSON file store for durable
//! use. The file store keeps one document per run and one per model, and
//! takes an exclusive file lock on the model before any mutation so that
//! separate processes serialise their promotions.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::{validate_model_name, Run, StoreResult, StoreStatus, TrackingStore};
use crate::registry::{apply_promotion, ModelVersion, PromotionRequest, StageTransition};

/// Versions and transition history of one model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    pub model_name: String,
    pub versions: Vec<ModelVersion>,
    pub transitions: Vec<StageTransition>,
}

impl ModelDocument {
    fn new(model_name: &str) -> Self {
        Self { model_name: model_name.to_string(), ..Self::default() }
    }

    fn next_version(&self) -> u32 {
        self.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1
    }

    fn create_version(&mut self, run_id: &str, artifact_uri: &str) -> ModelVersion {
        let mv = ModelVersion::new(&self.model_name, self.next_version(), run_id, artifact_uri);
        self.versions.push(mv.clone());
        mv
    }

    fn promote(&mut self, request: &PromotionRequest) -> StoreResult<Vec<StageTransition>> {
        let applied = apply_promotion(&mut self.versions, request)?;
        self.transitions.extend(applied.iter().cloned());
        Ok(applied)
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    runs: HashMap<String, Run>,
    models: BTreeMap<String, ModelDocument>,
}

/// In-memory tracking store for testing
///
/// A single mutex guards all state, which makes every operation atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InMemoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl TrackingStore for InMemoryStore {
    fn save_run(&self, run: &Run) -> StoreResult<()> {
        self.with_state(|s| s.runs.insert(run.run_id.clone(), run.clone()));
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> StoreResult<Option<Run>> {
        Ok(self.with_state(|s| s.runs.get(run_id).cloned()))
    }

    fn create_model_version(
        &self,
        model_name: &str,
        run_id: &str,
        artifact_uri: &str,
    ) -> StoreResult<ModelVersion> {
        validate_model_name(model_name)?;
        Ok(self.with_state(|s| {
            s.models
                .entry(model_name.to_string())
                .or_insert_with(|| ModelDocument::new(model_name))
                .create_version(run_id, artifact_uri)
        }))
    }

    fn get_model_version(&self, model_name: &str, version: u32) -> StoreResult<Option<ModelVersion>> {
        Ok(self.with_state(|s| {
            s.models
                .get(model_name)
                .and_then(|doc| doc.versions.iter().find(|v| v.version == version).cloned())
        }))
    }

    fn list_model_versions(&self, model_name: &str) -> StoreResult<Vec<ModelVersion>> {
        Ok(self.with_state(|s| {
            let mut versions = s.models.get(model_name).map(|d| d.versions.clone()).unwrap_or_default();
            versions.sort_by_key(|v| v.version);
            versions
        }))
    }

    fn list_model_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.with_state(|s| s.models.keys().cloned().collect()))
    }

    fn promote(&self, request: &PromotionRequest) -> StoreResult<Vec<StageTransition>> {
        self.with_state(|s| match s.models.get_mut(&request.model_name) {
            Some(doc) => doc.promote(request),
            None => Err(crate::registry::TransitionError::VersionNotFound(
                request.model_name.clone(),
                request.version,
            )
            .into()),
        })
    }

    fn transition_history(&self, model_name: &str) -> StoreResult<Vec<StageTransition>> {
        Ok(self.with_state(|s| {
            s.models.get(model_name).map(|d| d.transitions.clone()).unwrap_or_default()
        }))
    }

    fn ping(&self) -> StoreResult<StoreStatus> {
        Ok(StoreStatus {
            backend: "memory".to_string(),
            models: self.with_state(|s| s.models.len()),
        })
    }
}

/// JSON file-based tracking store
///
/// Layout under the root directory:
///
/// ```text
/// runs/{run_id}.json
/// models/{model_name}.json
/// models/{model_name}.lock
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    /// Serialises mutations from threads of this process
    local: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating its directories
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("runs"))?;
        fs::create_dir_all(root.join("models"))?;
        Ok(Self { root, local: Mutex::new(()) })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.root.join("runs").join(format!("{run_id}.json"))
    }

    fn model_path(&self, model_name: &str) -> PathBuf {
        self.root.join("models").join(format!("{model_name}.json"))
    }

    fn lock_path(&self, model_name: &str) -> PathBuf {
        self.root.join("models").join(format!("{model_name}.lock"))
    }

    fn read_document(&self, model_name: &str) -> StoreResult<Option<ModelDocument>> {
        let path = self.model_path(model_name);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Read-modify-write a model document under the process mutex and an
    /// exclusive lock on the model's lock file.
    fn with_model_lock<T>(
        &self,
        model_name: &str,
        f: impl FnOnce(&mut ModelDocument) -> StoreResult<T>,
    ) -> StoreResult<T> {
        validate_model_name(model_name)?;
        let _local = self.local.lock().unwrap_or_else(PoisonError::into_inner);

        let lock_file =
            OpenOptions::new().create(true).truncate(false).write(true).open(self.lock_path(model_name))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write()?;

        let mut doc =
            self.read_document(model_name)?.unwrap_or_else(|| ModelDocument::new(model_name));
        let value = f(&mut doc)?;
        write_atomic(&self.model_path(model_name), &serde_json::to_vec_pretty(&doc)?)?;
        Ok(value)
    }
}

/// Write to a sibling temp file and rename over the target
fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let tmp = path.with_extension(format!("json.tmp-{}", std::process::id()));
    {
        use std::io::Write;
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl TrackingStore for JsonFileStore {
    fn save_run(&self, run: &Run) -> StoreResult<()> {
        write_atomic(&self.run_path(&run.run_id), &serde_json::to_vec_pretty(run)?)
    }

    fn load_run(&self, run_id: &str) -> StoreResult<Option<Run>> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn create_model_version(
        &self,
        model_name: &str,
        run_id: &str,
        artifact_uri: &str,
    ) -> StoreResult<ModelVersion> {
        self.with_model_lock(model_name, |doc| Ok(doc.create_version(run_id, artifact_uri)))
    }

    fn get_model_version(&self, model_name: &str, version: u32) -> StoreResult<Option<ModelVersion>> {
        validate_model_name(model_name)?;
        Ok(self
            .read_document(model_name)?
            .and_then(|doc| doc.versions.into_iter().find(|v| v.version == version)))
    }

    fn list_model_versions(&self, model_name: &str) -> StoreResult<Vec<ModelVersion>> {
        validate_model_name(model_name)?;
        let mut versions = self.read_document(model_name)?.map(|d| d.versions).unwrap_or_default();
        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }

    fn list_model_names(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.join("models"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn promote(&self, request: &PromotionRequest) -> StoreResult<Vec<StageTransition>> {
        validate_model_name(&request.model_name)?;
        if self.read_document(&request.model_name)?.is_none() {
            return Err(crate::registry::TransitionError::VersionNotFound(
                request.model_name.clone(),
                request.version,
            )
            .into());
        }
        self.with_model_lock(&request.model_name, |doc| doc.promote(request))
    }

    fn transition_history(&self, model_name: &str) -> StoreResult<Vec<StageTransition>> {
        validate_model_name(model_name)?;
        Ok(self.read_document(model_name)?.map(|d| d.transitions).unwrap_or_default())
    }

    fn ping(&self) -> StoreResult<StoreStatus> {
        Ok(StoreStatus { backend: format!("file:{}", self.root.display()), models: self.list_model_names()?.len() })
    }
}
