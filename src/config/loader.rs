//! Loading the monitoring configuration from YAML

use std::fs;
use std::path::{Path, PathBuf};

use super::schema::MonitoringConfig;
use super::validate::{validate_config, ValidationError};

/// Configuration errors (fatal at startup)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse YAML config {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Key under which the configuration may be nested
const WRAPPER_KEY: &str = "mlops";

impl MonitoringConfig {
    /// Read, parse and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::parse_yaml(&yaml)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        validate_config(&config)?;
        tracing::debug!(path = %path.display(), models = ?config.models, "Loaded configuration");
        Ok(config)
    }

    /// Parse YAML, unwrapping a top-level `mlops:` key when present.
    ///
    /// An empty document yields the defaults. No validation is performed.
    pub fn parse_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let value = match value {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(mut map) if map.len() == 1 && map.contains_key(WRAPPER_KEY) => {
                map.remove(WRAPPER_KEY).unwrap_or(serde_yaml::Value::Null)
            }
            other => other,
        };
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }
}
