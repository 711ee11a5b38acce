//! Monitoring orchestration
//!
//! The only scheduled component. Each cycle runs four independent
//! sub-checks and writes one `monitoring_report_{YYYYMMDD_HHMM}.json`:
//!
//! - **health_check**: serving endpoint probe, tracking store ping, and a
//!   `Production` version per managed model
//! - **performance_monitoring**: accuracy over the last day of prediction
//!   logs against the `Production` version's recorded accuracy
//! - **drift_monitoring**: model drift per managed model
//! - **data_quality**: configured validation rule count
//!
//! Alerts go to every configured channel through [`AlertDispatcher`].

mod alert;
mod health;
mod orchestrator;
mod report;
mod scheduler;

#[cfg(test)]
mod tests;

pub use alert::{
    sink_for, Alert, AlertDispatcher, AlertError, AlertSink, DeliveryOutcome, FileSink, LogSink,
    SlackSink, WebhookSink,
};
pub use health::{HttpProbe, ServiceProbe};
pub use orchestrator::{recent_accuracy, MonitoringOrchestrator, RecentAccuracy};
pub use report::{
    AlertRecord, DriftMonitoringSummary, FailureKind, HealthChecks, HealthStatus,
    ModelAvailability, ModelDriftStatus, ModelPerformance, MonitoringReport, MonitoringSummary,
    OverallStatus, PerformanceReport, ProbeOutcome, QualityStatus, QualitySummary, Section,
    SectionFailure,
};
pub use scheduler::{shutdown_on_ctrl_c, Schedule, Scheduler};
