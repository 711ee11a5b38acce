//! Monitoring report types
//!
//! Field names follow the JSON layout consumed by dashboards:
//! `health_check.checks.{api,tracking,models}`, per-model performance and
//! drift entries tagged by `status`, and a `summary` block.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::DeliveryOutcome;
use crate::drift::ModelDriftReport;

/// Aggregate status of a check or a whole cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
            OverallStatus::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one reachability probe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// `Healthy` or `Unhealthy`
    pub status: OverallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Seconds until the response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl ProbeOutcome {
    pub fn healthy() -> Self {
        Self {
            status: OverallStatus::Healthy,
            status_code: None,
            response_time: None,
            error: None,
            details: BTreeMap::new(),
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self { status: OverallStatus::Unhealthy, error: Some(error.into()), ..Self::healthy() }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }
}

/// Whether a model has a version serving in `Production`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelAvailability {
    Available { version: u32 },
    Unavailable,
    Error { error: String },
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ModelAvailability::Available { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthChecks {
    pub api: ProbeOutcome,
    pub tracking: ProbeOutcome,
    pub models: BTreeMap<String, ModelAvailability>,
}

/// Output of the health check sub-check
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub timestamp: DateTime<Utc>,
    pub status: OverallStatus,
    pub checks: HealthChecks,
}

impl HealthStatus {
    /// Unhealthy if the serving probe fails, degraded if the tracking
    /// backend is down or a model has no `Production` version
    pub fn from_checks(checks: HealthChecks) -> Self {
        let status = if !checks.api.is_healthy() {
            OverallStatus::Unhealthy
        } else if !checks.tracking.is_healthy() || checks.models.values().any(|m| !m.is_available()) {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        };
        Self { timestamp: Utc::now(), status, checks }
    }
}

/// An alert raised during a sub-check and where it was delivered
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub subject: String,
    pub message: String,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Recent performance of one model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelPerformance {
    Measured {
        accuracy: f64,
        total_predictions: usize,
        prediction_files: usize,
        /// Accuracy recorded on the `Production` version, if any
        baseline_accuracy: Option<f64>,
        accuracy_drop: Option<f64>,
        threshold: f64,
        alert: Option<AlertRecord>,
    },
    NoRecentPredictions,
    Error {
        error: String,
    },
}

impl ModelPerformance {
    pub fn alert(&self) -> Option<&AlertRecord> {
        match self {
            ModelPerformance::Measured { alert, .. } => alert.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub timestamp: DateTime<Utc>,
    pub models: BTreeMap<String, ModelPerformance>,
}

/// Drift verdict for one model during monitoring
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelDriftStatus {
    NoDrift { report: ModelDriftReport },
    DriftDetected { report: ModelDriftReport, alert: Option<AlertRecord> },
    /// Fewer than two days of logs; no verdict either way
    InsufficientData,
    Error { error: String },
}

impl ModelDriftStatus {
    pub fn alert(&self) -> Option<&AlertRecord> {
        match self {
            ModelDriftStatus::DriftDetected { alert, .. } => alert.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftMonitoringSummary {
    pub timestamp: DateTime<Utc>,
    pub drift_detected: bool,
    pub models: BTreeMap<String, ModelDriftStatus>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    Passed,
}

/// Data quality placeholder: reports the configured rule count
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub timestamp: DateTime<Utc>,
    pub status: QualityStatus,
    pub checks_performed: usize,
}

/// Why a sub-check produced no result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TimedOut,
    Panicked,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub status: FailureKind,
    pub error: String,
}

/// One sub-check's slot in the monitoring report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Completed(T),
    Failed(SectionFailure),
}

impl<T> Section<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Section::Completed(value) => Some(value),
            Section::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSummary {
    pub models_monitored: Vec<String>,
    pub alerts_triggered: usize,
    pub recommendations: Vec<String>,
}

/// Combined output of one monitoring cycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub timestamp: DateTime<Utc>,
    pub overall_status: OverallStatus,
    pub health_check: Section<HealthStatus>,
    pub performance_monitoring: Section<PerformanceReport>,
    pub drift_monitoring: Section<DriftMonitoringSummary>,
    pub data_quality: Section<QualitySummary>,
    pub summary: MonitoringSummary,
}

impl MonitoringReport {
    /// Combine the four sub-check results and derive the overall status
    ///
    /// Unhealthy if the health check is unhealthy; else degraded if drift was
    /// detected or any sub-check failed to complete; else healthy.
    pub fn assemble(
        models_monitored: Vec<String>,
        health_check: Section<HealthStatus>,
        performance_monitoring: Section<PerformanceReport>,
        drift_monitoring: Section<DriftMonitoringSummary>,
        data_quality: Section<QualitySummary>,
    ) -> Self {
        let unhealthy =
            health_check.completed().is_some_and(|h| h.status == OverallStatus::Unhealthy);
        let drift_detected = drift_monitoring.completed().is_some_and(|d| d.drift_detected);
        let failed: Vec<&str> = [
            ("health_check", health_check.is_failed()),
            ("performance_monitoring", performance_monitoring.is_failed()),
            ("drift_monitoring", drift_monitoring.is_failed()),
            ("data_quality", data_quality.is_failed()),
        ]
        .into_iter()
        .filter_map(|(name, failed)| failed.then_some(name))
        .collect();

        let overall_status = if unhealthy {
            OverallStatus::Unhealthy
        } else if drift_detected || !failed.is_empty() {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        };

        let mut alerts_triggered = 0;
        let mut recommendations = Vec::new();
        if unhealthy {
            recommendations.push("Check the serving endpoint health".to_string());
        }
        if let Some(health) = health_check.completed() {
            if !health.checks.tracking.is_healthy() {
                recommendations.push("Check the tracking store".to_string());
            }
            for (model, availability) in &health.checks.models {
                if *availability == ModelAvailability::Unavailable {
                    recommendations.push(format!("Promote a version of {model} to Production"));
                }
            }
        }
        if let Some(performance) = performance_monitoring.completed() {
            for (model, entry) in &performance.models {
                if entry.alert().is_some() {
                    alerts_triggered += 1;
                    recommendations.push(format!("Review recent accuracy of {model}"));
                }
            }
        }
        if let Some(drift) = drift_monitoring.completed() {
            alerts_triggered += drift.models.values().filter(|m| m.alert().is_some()).count();
            if drift.drift_detected {
                recommendations.push("Investigate drift detection results".to_string());
            }
        }
        for name in failed {
            recommendations.push(format!("Re-run the {name} check"));
        }

        Self {
            timestamp: Utc::now(),
            overall_status,
            health_check,
            performance_monitoring,
            drift_monitoring,
            data_quality,
            summary: MonitoringSummary { models_monitored, alerts_triggered, recommendations },
        }
    }
}
