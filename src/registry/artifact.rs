//! Artifact reference resolution

use std::path::Path;

use super::error::{RegistryError, Result};

const REMOTE_SCHEMES: [&str; 4] = ["models:/", "s3://", "gs://", "hf://"];

/// Turns a caller-supplied artifact reference into a stored URI
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, artifact_ref: &str) -> Result<String>;
}

/// Accepts existing local paths and well-known remote URIs
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultArtifactResolver;

impl ArtifactResolver for DefaultArtifactResolver {
    fn resolve(&self, artifact_ref: &str) -> Result<String> {
        let trimmed = artifact_ref.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::Registration("empty artifact reference".to_string()));
        }
        if REMOTE_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
            return Ok(trimmed.to_string());
        }
        let path = Path::new(trimmed);
        if path.exists() {
            let absolute = path.canonicalize().map_err(|e| {
                RegistryError::Registration(format!("cannot resolve {trimmed}: {e}"))
            })?;
            return Ok(absolute.display().to_string());
        }
        Err(RegistryError::Registration(format!("artifact not found: {trimmed}")))
    }
}
