//! Model Registry
//!
//! Owns the model-version lifecycle. Stages form a closed enum with an
//! explicit transition table:
//!
//! ```text
//! None ──► Staging ──► Production ──► Archived
//!   └──────────────────────▲  ▲──────────┘ (manual)
//! ```
//!
//! Promotion to an exclusive stage archives the current holder in the same
//! store-level step, so at most one version holds `Staging` and at most one
//! holds `Production` per model.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use vigilar::registry::{ModelRegistry, ModelStage, PromotionPolicy};
//! use vigilar::tracking::InMemoryStore;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = ModelRegistry::new(Arc::new(InMemoryStore::new()));
//! let metrics = HashMap::from([("accuracy".to_string(), 0.88)]);
//! let v1 = registry.register_model("intent_classifier", "s3://models/intent", &metrics, &HashMap::new())?;
//!
//! let policy = PromotionPolicy::from_thresholds(&HashMap::from([("accuracy".to_string(), 0.85)]));
//! assert!(registry.auto_promote_model("intent_classifier", &policy));
//! assert!(registry.promote_model("intent_classifier", v1, ModelStage::Production, true));
//! # Ok(())
//! # }
//! ```

mod artifact;
mod comparison;
mod error;
mod model_registry;
mod policy;
mod report;
mod stage;
mod transition;
mod version;


pub use artifact::{ArtifactResolver, DefaultArtifactResolver};
pub use comparison::{Comparison, MetricRequirement, VersionComparison, VersionSnapshot};
pub use error::{RegistryError, Result};
pub use model_registry::ModelRegistry;
pub use policy::{MetricSource, PolicyCheckResult, PromotionPolicy};
pub use report::{ModelInfo, RegisteredModel, RegistryReport, RegistrySummary, VersionSummary};
pub use stage::ModelStage;
pub use transition::{apply_promotion, PromotionRequest, StageTransition, TransitionError};
pub use version::ModelVersion;
