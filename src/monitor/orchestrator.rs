//! Monitoring orchestrator
//!
//! Fans out to the serving probe, the registry and the drift detector, and
//! folds their results into one [`MonitoringReport`] per cycle. Blocking
//! store and file work runs on the blocking pool under a timeout, and every
//! sub-check runs in its own task so a panic or a stall only costs that
//! section of the report.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use super::alert::AlertDispatcher;
use super::health::{HttpProbe, ServiceProbe};
use super::report::{
    AlertRecord, DriftMonitoringSummary, FailureKind, HealthChecks, HealthStatus,
    ModelAvailability, ModelDriftStatus, ModelPerformance, MonitoringReport, PerformanceReport,
    ProbeOutcome, QualityStatus, QualitySummary, Section, SectionFailure,
};
use super::scheduler::{Schedule, Scheduler};
use crate::config::{parse_time_of_day, MonitoringConfig};
use crate::drift::DriftDetector;
use crate::predictions::{read_entries, PredictionLogIndex};
use crate::registry::{ModelRegistry, ModelStage};
use crate::report::{ReportKind, ReportWriter};
use crate::tracking::JsonFileStore;

/// Accuracy over recently modified prediction logs
#[derive(Debug, Clone, PartialEq)]
pub struct RecentAccuracy {
    pub accuracy: f64,
    pub total_predictions: usize,
    pub prediction_files: usize,
}

/// Accuracy over every log of `model_name` modified within `window` of `now`
///
/// Returns `None` when no such log has rows. Unreadable files are skipped.
pub fn recent_accuracy(
    predictions_dir: &Path,
    model_name: &str,
    window: Duration,
    now: SystemTime,
) -> crate::Result<Option<RecentAccuracy>> {
    let index = PredictionLogIndex::scan(predictions_dir)?;
    let files = index.modified_within(model_name, window, now);
    let mut total = 0usize;
    let mut correct = 0usize;
    for file in &files {
        match read_entries(&file.path) {
            Ok(entries) => {
                total += entries.len();
                correct += entries.iter().filter(|e| e.is_correct()).count();
            }
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "Skipping unreadable prediction log");
            }
        }
    }
    if total == 0 {
        return Ok(None);
    }
    Ok(Some(RecentAccuracy {
        accuracy: correct as f64 / total as f64,
        total_predictions: total,
        prediction_files: files.len(),
    }))
}

async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, String>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("task failed: {e}")),
        Err(_) => Err(format!("timed out after {timeout:?}")),
    }
}

/// Runs the monitoring sub-checks and writes monitoring reports
#[derive(Clone)]
pub struct MonitoringOrchestrator {
    config: Arc<MonitoringConfig>,
    registry: Arc<ModelRegistry>,
    detector: Arc<DriftDetector>,
    probe: Arc<dyn ServiceProbe>,
    alerts: AlertDispatcher,
    writer: ReportWriter,
}

impl std::fmt::Debug for MonitoringOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringOrchestrator")
            .field("models", &self.config.models)
            .field("alerts", &self.alerts)
            .field("reports_dir", &self.writer.dir())
            .finish_non_exhaustive()
    }
}

impl MonitoringOrchestrator {
    pub fn new(
        config: MonitoringConfig,
        registry: Arc<ModelRegistry>,
        probe: Arc<dyn ServiceProbe>,
        alerts: AlertDispatcher,
    ) -> Self {
        let detector =
            DriftDetector::new(config.drift_detection.clone(), config.paths.predictions_dir.clone());
        let writer = ReportWriter::new(config.paths.reports_dir.clone());
        Self {
            config: Arc::new(config),
            registry,
            detector: Arc::new(detector),
            probe,
            alerts,
            writer,
        }
    }

    /// Wire up the file-backed store, HTTP probe and configured alert channels
    pub fn from_config(config: MonitoringConfig) -> crate::Result<Self> {
        let store = JsonFileStore::open(&config.tracking.store_dir)?;
        let registry = Arc::new(ModelRegistry::new(Arc::new(store)));
        let probe = HttpProbe::new(config.deployment.health_url(), config.deployment.probe_timeout())?;
        let alerts = AlertDispatcher::from_config(&config.alerting)?;
        tracing::info!(
            models = ?config.models,
            health_url = probe.url(),
            channels = alerts.channel_count(),
            "Monitoring orchestrator ready"
        );
        Ok(Self::new(config, registry, Arc::new(probe), alerts))
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn report_writer(&self) -> &ReportWriter {
        &self.writer
    }

    fn tracking_timeout(&self) -> Duration {
        Duration::from_secs(self.config.tracking.timeout_secs)
    }

    /// Probe the serving endpoint, the tracking store and each model's
    /// `Production` version
    pub async fn health_check(&self) -> HealthStatus {
        tracing::info!("Running health check");
        let (api, tracking, models) =
            tokio::join!(self.probe.probe(), self.tracking_check(), self.model_availability());
        let status = HealthStatus::from_checks(HealthChecks { api, tracking, models });
        tracing::info!(status = %status.status, "Health check finished");
        status
    }

    async fn tracking_check(&self) -> ProbeOutcome {
        let store = Arc::clone(self.registry.store());
        let started = Instant::now();
        match run_blocking(self.tracking_timeout(), move || store.ping()).await {
            Ok(Ok(status)) => {
                let mut outcome = ProbeOutcome::healthy();
                outcome.response_time = Some(started.elapsed().as_secs_f64());
                outcome.details.insert("backend".to_string(), status.backend.into());
                outcome.details.insert("models".to_string(), status.models.into());
                outcome
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Tracking store unreachable");
                ProbeOutcome::unhealthy(e.to_string())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tracking store check failed");
                ProbeOutcome::unhealthy(e)
            }
        }
    }

    async fn model_availability(&self) -> BTreeMap<String, ModelAvailability> {
        let mut models = BTreeMap::new();
        for model in &self.config.models {
            let registry = Arc::clone(&self.registry);
            let name = model.clone();
            let info = run_blocking(self.tracking_timeout(), move || {
                registry.get_model_info(&name, ModelStage::Production)
            })
            .await;
            let availability = match info {
                Ok(Ok(Some(info))) => ModelAvailability::Available { version: info.version },
                Ok(Ok(None)) => {
                    tracing::warn!(model = %model, "No Production version");
                    ModelAvailability::Unavailable
                }
                Ok(Err(e)) => ModelAvailability::Error { error: e.to_string() },
                Err(e) => ModelAvailability::Error { error: e },
            };
            models.insert(model.clone(), availability);
        }
        models
    }

    /// Compare recent accuracy of each model against its `Production` baseline
    pub async fn performance_monitoring(&self) -> PerformanceReport {
        tracing::info!("Running performance monitoring");
        let mut models = BTreeMap::new();
        for model in &self.config.models {
            let entry = self.model_performance(model).await;
            models.insert(model.clone(), entry);
        }
        PerformanceReport { timestamp: chrono::Utc::now(), models }
    }

    async fn model_performance(&self, model: &str) -> ModelPerformance {
        let dir = self.config.paths.predictions_dir.clone();
        let window = self.config.monitoring.performance_window();
        let registry = Arc::clone(&self.registry);
        let name = model.to_string();
        let deadline = self.config.monitoring.cycle_soft_deadline();
        let measured = run_blocking(deadline, move || -> crate::Result<Option<(RecentAccuracy, Option<f64>)>> {
            let Some(recent) = recent_accuracy(&dir, &name, window, SystemTime::now())? else {
                return Ok(None);
            };
            let baseline = registry
                .get_model_info(&name, ModelStage::Production)?
                .and_then(|info| info.metrics.get("accuracy").copied());
            Ok(Some((recent, baseline)))
        })
        .await;

        let (recent, baseline_accuracy) = match measured {
            Ok(Ok(Some(measured))) => measured,
            Ok(Ok(None)) => {
                tracing::info!(model, "No recent predictions");
                return ModelPerformance::NoRecentPredictions;
            }
            Ok(Err(e)) => return ModelPerformance::Error { error: e.to_string() },
            Err(e) => return ModelPerformance::Error { error: e },
        };

        let threshold = self.config.monitoring.accuracy_drop_for(model);
        let accuracy_drop = baseline_accuracy.map(|baseline| baseline - recent.accuracy);
        let alert = match (baseline_accuracy, accuracy_drop) {
            (Some(baseline), Some(drop)) if drop > threshold => Some(
                self.send_alert(
                    &format!("Performance Alert: {model}"),
                    &format!(
                        "Accuracy dropped by {drop:.3} (current: {:.3}, baseline: {baseline:.3})",
                        recent.accuracy
                    ),
                )
                .await,
            ),
            _ => None,
        };

        ModelPerformance::Measured {
            accuracy: recent.accuracy,
            total_predictions: recent.total_predictions,
            prediction_files: recent.prediction_files,
            baseline_accuracy,
            accuracy_drop,
            threshold,
            alert,
        }
    }

    /// Model drift for each model over the configured window
    pub async fn drift_monitoring(&self) -> DriftMonitoringSummary {
        tracing::info!("Running drift monitoring");
        let mut models = BTreeMap::new();
        for model in &self.config.models {
            let detector = Arc::clone(&self.detector);
            let name = model.clone();
            let verdict = run_blocking(self.config.monitoring.cycle_soft_deadline(), move || {
                detector.detect_model_drift(&name, None)
            })
            .await;
            let status = match verdict {
                Ok(Ok(Some(report))) if report.drift_detected => {
                    let message = format!(
                        "Drift detected for model {model}: accuracy {:.3} against baseline {:.3} (drop {:.3}, threshold {:.3})",
                        report.current_accuracy,
                        report.baseline_accuracy,
                        report.performance_drop,
                        report.threshold
                    );
                    let alert = self.send_alert(&format!("Drift Alert: {model}"), &message).await;
                    ModelDriftStatus::DriftDetected { report, alert: Some(alert) }
                }
                Ok(Ok(Some(report))) => ModelDriftStatus::NoDrift { report },
                Ok(Ok(None)) => ModelDriftStatus::InsufficientData,
                Ok(Err(e)) => {
                    tracing::error!(model = %model, error = %e, "Drift monitoring failed");
                    ModelDriftStatus::Error { error: e.to_string() }
                }
                Err(e) => {
                    tracing::error!(model = %model, error = %e, "Drift monitoring failed");
                    ModelDriftStatus::Error { error: e }
                }
            };
            models.insert(model.clone(), status);
        }
        let drift_detected = models.values().any(|s| matches!(s, ModelDriftStatus::DriftDetected { .. }));
        DriftMonitoringSummary { timestamp: chrono::Utc::now(), drift_detected, models }
    }

    /// Reports the number of configured validation rules
    pub fn data_quality_monitoring(&self) -> QualitySummary {
        tracing::info!("Running data quality monitoring");
        QualitySummary {
            timestamp: chrono::Utc::now(),
            status: QualityStatus::Passed,
            checks_performed: self.config.data_quality.validation_rules.len(),
        }
    }

    /// Fan an alert out to every configured channel
    pub async fn send_alert(&self, subject: &str, message: &str) -> AlertRecord {
        let deliveries = self.alerts.send(subject, message).await;
        AlertRecord { subject: subject.to_string(), message: message.to_string(), deliveries }
    }

    /// Run all four sub-checks, derive the overall status and persist the report
    ///
    /// Sub-checks still running at the soft deadline are recorded as timed
    /// out; the report is written regardless.
    pub async fn generate_monitoring_report(&self) -> crate::Result<(MonitoringReport, PathBuf)> {
        tracing::info!("Generating monitoring report");
        let deadline = Instant::now() + self.config.monitoring.cycle_soft_deadline();

        let (health, performance, drift, quality) = tokio::join!(
            section("health_check", deadline, {
                let this = self.clone();
                async move { this.health_check().await }
            }),
            section("performance_monitoring", deadline, {
                let this = self.clone();
                async move { this.performance_monitoring().await }
            }),
            section("drift_monitoring", deadline, {
                let this = self.clone();
                async move { this.drift_monitoring().await }
            }),
            section("data_quality", deadline, {
                let this = self.clone();
                async move { this.data_quality_monitoring() }
            }),
        );

        let report =
            MonitoringReport::assemble(self.config.models.clone(), health, performance, drift, quality);
        let path = self.writer.write(ReportKind::Monitoring, &report)?;
        tracing::info!(
            path = %path.display(),
            status = %report.overall_status,
            alerts = report.summary.alerts_triggered,
            "Monitoring report saved"
        );
        Ok((report, path))
    }

    /// Monitoring report every `check_interval_hours`, drift monitoring daily
    pub fn scheduler(&self) -> crate::Result<Scheduler> {
        let monitoring = &self.config.monitoring;
        let daily_at = parse_time_of_day(&monitoring.daily_drift_check_at)
            .map_err(|e| crate::Error::Config(e.into()))?;

        let this = self.clone();
        let report_task = move || {
            let this = this.clone();
            async move {
                if let Err(e) = this.generate_monitoring_report().await {
                    tracing::error!(error = %e, "Monitoring cycle failed to persist its report");
                }
            }
        };
        let this = self.clone();
        let drift_task = move || {
            let this = this.clone();
            async move {
                let summary = this.drift_monitoring().await;
                tracing::info!(drift_detected = summary.drift_detected, "Daily drift monitoring finished");
            }
        };

        Ok(Scheduler::new(monitoring.poll_interval())
            .task("monitoring_report", Schedule::Every(monitoring.check_interval()), report_task)
            .task("drift_monitoring", Schedule::DailyAt(daily_at), drift_task))
    }
}

async fn section<T, F>(name: &'static str, deadline: Instant, check: F) -> Section<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let mut handle = tokio::spawn(check);
    match tokio::time::timeout_at(deadline, &mut handle).await {
        Ok(Ok(value)) => Section::Completed(value),
        Ok(Err(e)) => {
            tracing::error!(section = name, error = %e, "Sub-check aborted");
            Section::Failed(SectionFailure { status: FailureKind::Panicked, error: e.to_string() })
        }
        Err(_) => {
            handle.abort();
            tracing::warn!(section = name, "Sub-check exceeded the cycle deadline");
            Section::Failed(SectionFailure {
                status: FailureKind::TimedOut,
                error: "exceeded the cycle soft deadline".to_string(),
            })
        }
    }
}
