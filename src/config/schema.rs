//! YAML schema for the monitoring configuration
//!
//! Every field has a default, so a minimal (even empty) file is valid. The
//! document may be wrapped in a top-level `mlops:` key.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complete monitoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub drift_detection: DriftDetectionConfig,
    pub monitoring: MonitorSettings,
    /// Managed model names
    pub models: Vec<String>,
    pub alerting: AlertingConfig,
    pub deployment: DeploymentConfig,
    pub tracking: TrackingConfig,
    pub paths: PathsConfig,
    pub data_quality: DataQualityConfig,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            drift_detection: DriftDetectionConfig::default(),
            monitoring: MonitorSettings::default(),
            models: vec!["intent_classifier".to_string(), "reply_generator".to_string()],
            alerting: AlertingConfig::default(),
            deployment: DeploymentConfig::default(),
            tracking: TrackingConfig::default(),
            paths: PathsConfig::default(),
            data_quality: DataQualityConfig::default(),
        }
    }
}

/// Drift detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftDetectionConfig {
    /// p-value below which a feature has drifted
    pub data_drift_threshold: f64,
    /// Fractional accuracy drop above which a model has drifted
    pub performance_drift_threshold: f64,
    pub monitoring_window_days: u32,
}

impl Default for DriftDetectionConfig {
    fn default() -> Self {
        Self { data_drift_threshold: 0.05, performance_drift_threshold: 0.10, monitoring_window_days: 7 }
    }
}

/// Scheduling and performance alert settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub check_interval_hours: u64,
    /// Per-model accuracy drop that raises a performance alert
    pub alert_thresholds: BTreeMap<String, f64>,
    /// Accuracy drop for models without an entry in `alert_thresholds`
    pub default_accuracy_drop: f64,
    /// Local wall-clock time of the daily drift check, `HH:MM`
    pub daily_drift_check_at: String,
    pub poll_interval_secs: u64,
    /// A cycle running longer than this persists what it has
    pub cycle_soft_deadline_secs: u64,
    /// Prediction logs modified within this window count as recent
    pub performance_window_hours: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval_hours: 6,
            alert_thresholds: BTreeMap::new(),
            default_accuracy_drop: 0.10,
            daily_drift_check_at: "06:00".to_string(),
            poll_interval_secs: 60,
            cycle_soft_deadline_secs: 300,
            performance_window_hours: 24,
        }
    }
}

impl MonitorSettings {
    pub fn accuracy_drop_for(&self, model_name: &str) -> f64 {
        self.alert_thresholds.get(model_name).copied().unwrap_or(self.default_accuracy_drop)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_hours.saturating_mul(3600))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn cycle_soft_deadline(&self) -> Duration {
        Duration::from_secs(self.cycle_soft_deadline_secs)
    }

    pub fn performance_window(&self) -> Duration {
        Duration::from_secs(self.performance_window_hours.saturating_mul(3600))
    }
}

/// Alert fan-out settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    pub enabled: bool,
    /// Per-attempt delivery timeout
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub channels: Vec<ChannelConfig>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self { enabled: true, timeout_secs: 10, max_retries: 2, channels: Vec::new() }
    }
}

/// One alert channel, `{type, destination}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub destination: String,
}

/// Supported alert channel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Webhook,
    Slack,
    Log,
    File,
}

impl ChannelKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "webhook" => Some(ChannelKind::Webhook),
            "slack" => Some(ChannelKind::Slack),
            "log" => Some(ChannelKind::Log),
            "file" => Some(ChannelKind::File),
            _ => None,
        }
    }

    pub fn needs_destination(&self) -> bool {
        !matches!(self, ChannelKind::Log)
    }
}

/// Serving endpoint probed by the health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub base_url: String,
    pub health_check_endpoint: String,
    pub probe_timeout_secs: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            health_check_endpoint: "/health".to_string(),
            probe_timeout_secs: 10,
        }
    }
}

impl DeploymentConfig {
    pub fn health_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.health_check_endpoint.starts_with('/') {
            format!("{base}{}", self.health_check_endpoint)
        } else {
            format!("{base}/{}", self.health_check_endpoint)
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Tracking store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub store_dir: PathBuf,
    /// Bound on a reachability probe of the store
    pub timeout_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { store_dir: PathBuf::from("mlops/tracking"), timeout_secs: 10 }
    }
}

/// Filesystem locations of logs and reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub predictions_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            predictions_dir: PathBuf::from("mlops/predictions"),
            reports_dir: PathBuf::from("mlops/reports"),
        }
    }
}

/// Data quality rules, counted but not evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQualityConfig {
    pub validation_rules: Vec<serde_yaml::Value>,
}
