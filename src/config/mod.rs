//! Configuration: YAML schema, validation and the command-line surface
//!
//! ```yaml
//! mlops:
//!   drift_detection:
//!     data_drift_threshold: 0.05
//!     performance_drift_threshold: 0.1
//!     monitoring_window_days: 7
//!   monitoring:
//!     check_interval_hours: 6
//!     alert_thresholds:
//!       intent_classifier: 0.05
//!   alerting:
//!     enabled: true
//!     channels:
//!       - type: slack
//!         destination: https://hooks.slack.com/services/T000/B000/XXX
//!   deployment:
//!     health_check_endpoint: /health
//! ```

mod cli;
mod loader;
mod schema;
mod validate;


pub use cli::{
    AutoPromoteArgs, Cli, Command, CompareArgs, DriftArgs, InfoArgs, ListArgs, LogFormat,
    MonitorArgs, PromoteArgs, RegisterArgs, RunMode,
};
pub use loader::ConfigError;
pub use schema::{
    AlertingConfig, ChannelConfig, ChannelKind, DataQualityConfig, DeploymentConfig,
    DriftDetectionConfig, MonitorSettings, MonitoringConfig, PathsConfig, TrackingConfig,
};
pub use validate::{parse_time_of_day, validate_config, ValidationError};
