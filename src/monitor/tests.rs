use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use tempfile::TempDir;

use super::*;
use crate::config::{ChannelConfig, MonitoringConfig};
use crate::predictions::{PredictionLog, PredictionLogEntry};
use crate::registry::{ModelRegistry, ModelStage};
use crate::report::ReportKind;
use crate::tracking::InMemoryStore;

const MODEL: &str = "intent_classifier";

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// Health probe
// =============================================================================

#[tokio::test]
async fn test_http_probe_healthy_on_200() {
    let addr = serve(Router::new().route("/health", get(|| async { "ok" }))).await;
    let probe = HttpProbe::new(format!("http://{addr}/health"), Duration::from_secs(2)).unwrap();
    let outcome = probe.probe().await;
    assert_eq!(outcome.status, OverallStatus::Healthy);
    assert_eq!(outcome.status_code, Some(200));
    assert!(outcome.response_time.is_some());
}

#[tokio::test]
async fn test_http_probe_unhealthy_on_non_200() {
    let app = Router::new().route("/health", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }));
    let addr = serve(app).await;
    let probe = HttpProbe::new(format!("http://{addr}/health"), Duration::from_secs(2)).unwrap();
    let outcome = probe.probe().await;
    assert_eq!(outcome.status, OverallStatus::Unhealthy);
    assert_eq!(outcome.status_code, Some(503));
}

#[tokio::test]
async fn test_http_probe_unhealthy_when_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let probe = HttpProbe::new(format!("http://{addr}/health"), Duration::from_secs(2)).unwrap();
    let outcome = probe.probe().await;
    assert_eq!(outcome.status, OverallStatus::Unhealthy);
    assert!(outcome.error.is_some());
    assert!(outcome.status_code.is_none());
}

#[tokio::test]
async fn test_http_probe_times_out() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let addr = serve(app).await;
    let probe = HttpProbe::new(format!("http://{addr}/health"), Duration::from_millis(200)).unwrap();
    let started = std::time::Instant::now();
    let outcome = probe.probe().await;
    assert_eq!(outcome.status, OverallStatus::Unhealthy);
    assert!(started.elapsed() < Duration::from_secs(3));
}

// =============================================================================
// Alert fan-out
// =============================================================================

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<Alert>>>);

impl RecordingSink {
    fn subjects(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|a| a.subject.clone()).collect()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn describe(&self) -> String {
        "recording".to_string()
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
        self.0.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FailingSink(Arc<AtomicU32>);

#[async_trait]
impl AlertSink for FailingSink {
    fn describe(&self) -> String {
        "failing".to_string()
    }

    async fn deliver(&self, _alert: &Alert) -> Result<(), AlertError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(AlertError::Rejected { destination: "failing".to_string(), status: 500 })
    }
}

struct HangingSink;

#[async_trait]
impl AlertSink for HangingSink {
    fn describe(&self) -> String {
        "hanging".to_string()
    }

    async fn deliver(&self, _alert: &Alert) -> Result<(), AlertError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test]
async fn test_failing_channel_does_not_block_others() {
    let failing = FailingSink::default();
    let recording = RecordingSink::default();
    let dispatcher = AlertDispatcher::new(
        vec![Arc::new(failing.clone()), Arc::new(recording.clone())],
        Duration::from_secs(1),
        1,
    );

    let outcomes = dispatcher.send("Drift Alert: m", "details").await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].channel, "failing");
    assert!(!outcomes[0].delivered);
    assert_eq!(outcomes[0].attempts, 2);
    assert!(outcomes[0].error.as_deref().unwrap().contains("500"));
    assert!(outcomes[1].delivered);
    assert_eq!(outcomes[1].attempts, 1);
    assert_eq!(failing.0.load(Ordering::SeqCst), 2);
    assert_eq!(recording.subjects(), vec!["Drift Alert: m"]);
}

#[tokio::test]
async fn test_hanging_channel_times_out() {
    let recording = RecordingSink::default();
    let dispatcher = AlertDispatcher::new(
        vec![Arc::new(HangingSink), Arc::new(recording.clone())],
        Duration::from_millis(50),
        0,
    );
    let outcomes = dispatcher.send("s", "m").await;
    assert!(!outcomes[0].delivered);
    assert!(outcomes[0].error.as_deref().unwrap().contains("timed out"));
    assert!(outcomes[1].delivered);
}

#[tokio::test]
async fn test_disabled_dispatcher_drops_alerts() {
    let dispatcher = AlertDispatcher::disabled();
    assert!(!dispatcher.is_enabled());
    assert!(dispatcher.send("s", "m").await.is_empty());
}

fn capture_app(path: &'static str, seen: Arc<Mutex<Vec<serde_json::Value>>>) -> Router {
    Router::new().route(
        path,
        post(move |Json(body): Json<serde_json::Value>| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(body);
                StatusCode::OK
            }
        }),
    )
}

#[tokio::test]
async fn test_webhook_and_slack_payloads() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let addr = serve(capture_app("/hook", Arc::clone(&seen))).await;
    let client = reqwest::Client::new();
    let alert = Alert::new("Performance Alert: m", "Accuracy dropped by 0.200");

    WebhookSink::new(client.clone(), format!("http://{addr}/hook")).deliver(&alert).await.unwrap();
    SlackSink::new(client, format!("http://{addr}/hook")).deliver(&alert).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["subject"], "Performance Alert: m");
    assert_eq!(seen[0]["message"], "Accuracy dropped by 0.200");
    assert_eq!(seen[1]["text"], "*Performance Alert: m*\nAccuracy dropped by 0.200");
}

#[tokio::test]
async fn test_webhook_rejection_is_an_error() {
    let app = Router::new().route("/hook", post(|| async { StatusCode::BAD_GATEWAY }));
    let addr = serve(app).await;
    let sink = WebhookSink::new(reqwest::Client::new(), format!("http://{addr}/hook"));
    let err = sink.deliver(&Alert::new("s", "m")).await.unwrap_err();
    assert!(matches!(err, AlertError::Rejected { status: 502, .. }));
}

#[tokio::test]
async fn test_file_sink_appends_json_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("alerts").join("alerts.jsonl");
    let sink = FileSink::new(&path);
    sink.deliver(&Alert::new("first", "a")).await.unwrap();
    sink.deliver(&Alert::new("second", "b")).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let alerts: Vec<Alert> = content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1].subject, "second");
}

#[test]
fn test_sink_for_rejects_unknown_type() {
    let channel = ChannelConfig { channel_type: "pager".to_string(), destination: "x".to_string() };
    let err = sink_for(&channel, &reqwest::Client::new()).err().unwrap();
    assert!(matches!(err, AlertError::UnknownChannel(_)));

    let channel = ChannelConfig { channel_type: "log".to_string(), destination: String::new() };
    assert_eq!(sink_for(&channel, &reqwest::Client::new()).unwrap().describe(), "log");
}

// =============================================================================
// Scheduler
// =============================================================================

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest().unwrap()
}

#[test]
fn test_schedule_every_adds_interval() {
    let now = local(2024, 6, 1, 12, 0);
    let next = Schedule::Every(Duration::from_secs(6 * 3600)).next_after(now);
    assert_eq!(next, local(2024, 6, 1, 18, 0));
}

#[test]
fn test_schedule_every_unrepresentable_interval_falls_back_to_a_day() {
    let now = local(2024, 6, 1, 12, 0);
    let next = Schedule::Every(Duration::from_secs(u64::MAX)).next_after(now);
    assert_eq!(next, local(2024, 6, 2, 12, 0));
    // Fits a TimeDelta but lands past the last representable date
    let next = Schedule::Every(Duration::from_secs(9_000_000_000_000_000)).next_after(now);
    assert_eq!(next, local(2024, 6, 2, 12, 0));
}

#[test]
fn test_schedule_daily_at_today_or_tomorrow() {
    let at = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
    assert_eq!(Schedule::DailyAt(at).next_after(local(2024, 6, 1, 5, 30)), local(2024, 6, 1, 6, 0));
    assert_eq!(Schedule::DailyAt(at).next_after(local(2024, 6, 1, 6, 0)), local(2024, 6, 2, 6, 0));
    assert_eq!(Schedule::DailyAt(at).next_after(local(2024, 6, 1, 23, 59)), local(2024, 6, 2, 6, 0));
}

#[tokio::test]
async fn test_scheduler_runs_due_tasks_until_shutdown() {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    let scheduler = Scheduler::new(Duration::from_millis(10)).task(
        "tick",
        Schedule::Every(Duration::from_millis(30)),
        move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        },
    );
    assert_eq!(scheduler.task_names(), vec!["tick"]);

    let (tx, rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(scheduler.run(rx));
    tokio::time::sleep(Duration::from_millis(250)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

    let count = runs.load(Ordering::SeqCst);
    assert!(count >= 2, "ran {count} times");
    let after = runs.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(runs.load(Ordering::SeqCst), after);
}

#[tokio::test]
async fn test_scheduler_stops_before_first_run() {
    let scheduler = Scheduler::new(Duration::from_secs(60)).task(
        "daily",
        Schedule::Every(Duration::from_secs(3600)),
        || async {},
    );
    let (tx, rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(scheduler.run(rx));
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

// =============================================================================
// Orchestrator
// =============================================================================

struct StubProbe(OverallStatus);

#[async_trait]
impl ServiceProbe for StubProbe {
    async fn probe(&self) -> ProbeOutcome {
        match self.0 {
            OverallStatus::Healthy => ProbeOutcome { status_code: Some(200), ..ProbeOutcome::healthy() },
            _ => ProbeOutcome::unhealthy("connection refused"),
        }
    }
}

struct SlowProbe;

#[async_trait]
impl ServiceProbe for SlowProbe {
    async fn probe(&self) -> ProbeOutcome {
        tokio::time::sleep(Duration::from_secs(30)).await;
        ProbeOutcome::healthy()
    }
}

struct PanickingProbe;

#[async_trait]
impl ServiceProbe for PanickingProbe {
    async fn probe(&self) -> ProbeOutcome {
        panic!("probe exploded");
    }
}

struct Fixture {
    _dir: TempDir,
    orchestrator: MonitoringOrchestrator,
    alerts: RecordingSink,
    log: PredictionLog,
}

fn fixture_with(probe: Arc<dyn ServiceProbe>, tweak: impl FnOnce(&mut MonitoringConfig)) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut config = MonitoringConfig { models: vec![MODEL.to_string()], ..Default::default() };
    config.paths.predictions_dir = dir.path().join("predictions");
    config.paths.reports_dir = dir.path().join("reports");
    config.data_quality.validation_rules = vec![serde_yaml::Value::Null, serde_yaml::Value::Null];
    tweak(&mut config);

    let alerts = RecordingSink::default();
    let dispatcher = AlertDispatcher::new(vec![Arc::new(alerts.clone())], Duration::from_secs(1), 0);
    let registry = Arc::new(ModelRegistry::new(Arc::new(InMemoryStore::new())));
    let log = PredictionLog::new(config.paths.predictions_dir.clone());
    let orchestrator = MonitoringOrchestrator::new(config, registry, probe, dispatcher);
    Fixture { _dir: dir, orchestrator, alerts, log }
}

fn fixture(probe: OverallStatus) -> Fixture {
    fixture_with(Arc::new(StubProbe(probe)), |_| {})
}

impl Fixture {
    fn promote_production(&self, accuracy: f64) -> u32 {
        let registry = self.orchestrator.registry();
        let metrics = HashMap::from([("accuracy".to_string(), accuracy)]);
        let version = registry.register_model(MODEL, "s3://models/intent", &metrics, &HashMap::new()).unwrap();
        assert!(registry.promote_model(MODEL, version, ModelStage::Production, true));
        version
    }

    fn log_day(&self, date: NaiveDate, correct: usize, wrong: usize) {
        let mut entries = vec![PredictionLogEntry::new("billing", "billing"); correct];
        entries.extend(vec![PredictionLogEntry::new("billing", "refund"); wrong]);
        self.log.append(MODEL, date, &entries).unwrap();
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::test]
async fn test_health_degraded_without_production_version() {
    let f = fixture(OverallStatus::Healthy);
    let health = f.orchestrator.health_check().await;
    assert_eq!(health.status, OverallStatus::Degraded);
    assert_eq!(health.checks.models[MODEL], ModelAvailability::Unavailable);
    assert!(health.checks.tracking.is_healthy());
    assert_eq!(health.checks.tracking.details["backend"], "memory");
}

#[tokio::test]
async fn test_health_healthy_with_production_version() {
    let f = fixture(OverallStatus::Healthy);
    let version = f.promote_production(0.9);
    let health = f.orchestrator.health_check().await;
    assert_eq!(health.status, OverallStatus::Healthy);
    assert_eq!(health.checks.models[MODEL], ModelAvailability::Available { version });
}

#[tokio::test]
async fn test_health_unhealthy_when_serving_probe_fails() {
    let f = fixture(OverallStatus::Unhealthy);
    f.promote_production(0.9);
    let health = f.orchestrator.health_check().await;
    assert_eq!(health.status, OverallStatus::Unhealthy);
    assert_eq!(health.checks.api.error.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn test_performance_without_recent_logs() {
    let f = fixture(OverallStatus::Healthy);
    let report = f.orchestrator.performance_monitoring().await;
    assert_eq!(report.models[MODEL], ModelPerformance::NoRecentPredictions);
    assert!(f.alerts.subjects().is_empty());
}

#[tokio::test]
async fn test_performance_alerts_on_accuracy_drop() {
    let f = fixture(OverallStatus::Healthy);
    f.promote_production(0.9);
    f.log_day(today(), 6, 4);
    f.log_day(today().pred_opt().unwrap(), 8, 2);

    let report = f.orchestrator.performance_monitoring().await;
    let ModelPerformance::Measured {
        accuracy, total_predictions, prediction_files, baseline_accuracy, accuracy_drop, threshold, alert,
    } = &report.models[MODEL]
    else {
        panic!("expected measured performance, got {:?}", report.models[MODEL]);
    };
    assert!((accuracy - 0.7).abs() < 1e-9);
    assert_eq!(*total_predictions, 20);
    assert_eq!(*prediction_files, 2);
    assert_eq!(*baseline_accuracy, Some(0.9));
    assert!((accuracy_drop.unwrap() - 0.2).abs() < 1e-9);
    assert_eq!(*threshold, 0.10);
    let alert = alert.as_ref().unwrap();
    assert_eq!(alert.subject, "Performance Alert: intent_classifier");
    assert!(alert.message.contains("current: 0.700, baseline: 0.900"));
    assert!(alert.deliveries[0].delivered);
    assert_eq!(f.alerts.subjects(), vec!["Performance Alert: intent_classifier"]);
}

#[tokio::test]
async fn test_performance_uses_per_model_threshold() {
    let f = fixture_with(Arc::new(StubProbe(OverallStatus::Healthy)), |c| {
        c.monitoring.alert_thresholds.insert(MODEL.to_string(), 0.25);
    });
    f.promote_production(0.9);
    f.log_day(today(), 7, 3);
    let report = f.orchestrator.performance_monitoring().await;
    assert!(report.models[MODEL].alert().is_none());
    assert!(f.alerts.subjects().is_empty());
}

#[tokio::test]
async fn test_performance_without_baseline_measures_only() {
    let f = fixture(OverallStatus::Healthy);
    f.log_day(today(), 1, 9);
    let report = f.orchestrator.performance_monitoring().await;
    let ModelPerformance::Measured { baseline_accuracy, alert, .. } = &report.models[MODEL] else {
        panic!("expected measured performance");
    };
    assert!(baseline_accuracy.is_none());
    assert!(alert.is_none());
}

#[test]
fn test_recent_accuracy_skips_stale_and_unreadable_logs() {
    let dir = TempDir::new().unwrap();
    let log = PredictionLog::new(dir.path());
    let entries = vec![PredictionLogEntry::new("a", "a"), PredictionLogEntry::new("a", "b")];
    log.append(MODEL, today(), &entries).unwrap();
    std::fs::write(dir.path().join(format!("{MODEL}_20200101.csv")), [0xff, 0xfe, 0x00]).unwrap();

    let recent = recent_accuracy(dir.path(), MODEL, Duration::from_secs(3600), SystemTime::now()).unwrap().unwrap();
    assert_eq!(recent.total_predictions, 2);
    assert_eq!(recent.accuracy, 0.5);

    let future = SystemTime::now() + Duration::from_secs(7200);
    assert!(recent_accuracy(dir.path(), MODEL, Duration::from_secs(3600), future).unwrap().is_none());
    assert!(recent_accuracy(&dir.path().join("absent"), MODEL, Duration::from_secs(60), SystemTime::now())
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_drift_monitoring_detects_and_alerts() {
    let f = fixture(OverallStatus::Healthy);
    f.log_day(today() - chrono::Duration::days(1), 10, 0);
    f.log_day(today(), 5, 5);

    let summary = f.orchestrator.drift_monitoring().await;
    assert!(summary.drift_detected);
    let ModelDriftStatus::DriftDetected { report, alert } = &summary.models[MODEL] else {
        panic!("expected drift, got {:?}", summary.models[MODEL]);
    };
    assert!((report.performance_drop - 0.5).abs() < 1e-9);
    assert_eq!(alert.as_ref().unwrap().subject, "Drift Alert: intent_classifier");
    assert_eq!(f.alerts.subjects(), vec!["Drift Alert: intent_classifier"]);
}

#[tokio::test]
async fn test_drift_monitoring_insufficient_data_is_no_verdict() {
    let f = fixture(OverallStatus::Healthy);
    f.log_day(today(), 5, 5);
    let summary = f.orchestrator.drift_monitoring().await;
    assert!(!summary.drift_detected);
    assert_eq!(summary.models[MODEL], ModelDriftStatus::InsufficientData);
}

#[tokio::test]
async fn test_drift_monitoring_stable_model() {
    let f = fixture(OverallStatus::Healthy);
    f.log_day(today() - chrono::Duration::days(2), 9, 1);
    f.log_day(today(), 9, 1);
    let summary = f.orchestrator.drift_monitoring().await;
    assert!(!summary.drift_detected);
    assert!(matches!(summary.models[MODEL], ModelDriftStatus::NoDrift { .. }));
    assert!(f.alerts.subjects().is_empty());
}

#[test]
fn test_data_quality_counts_rules() {
    let f = fixture(OverallStatus::Healthy);
    let quality = f.orchestrator.data_quality_monitoring();
    assert_eq!(quality.status, QualityStatus::Passed);
    assert_eq!(quality.checks_performed, 2);
}

#[tokio::test]
async fn test_monitoring_report_healthy_cycle() {
    let f = fixture(OverallStatus::Healthy);
    f.promote_production(0.9);
    let (report, path) = f.orchestrator.generate_monitoring_report().await.unwrap();
    assert_eq!(report.overall_status, OverallStatus::Healthy);
    assert_eq!(report.summary.models_monitored, vec![MODEL]);
    assert_eq!(report.summary.alerts_triggered, 0);
    assert!(report.summary.recommendations.is_empty());

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["overall_status"], "healthy");
    assert_eq!(json["health_check"]["checks"]["models"][MODEL]["status"], "available");
    assert_eq!(json["performance_monitoring"]["models"][MODEL]["status"], "no_recent_predictions");
    assert_eq!(json["drift_monitoring"]["models"][MODEL]["status"], "insufficient_data");
    assert_eq!(json["data_quality"]["status"], "passed");
}

#[tokio::test]
async fn test_monitoring_report_degraded_on_drift() {
    let f = fixture(OverallStatus::Healthy);
    f.promote_production(0.9);
    f.log_day(today() - chrono::Duration::days(1), 10, 0);
    f.log_day(today(), 5, 5);

    let (report, _) = f.orchestrator.generate_monitoring_report().await.unwrap();
    assert_eq!(report.overall_status, OverallStatus::Degraded);
    assert!(report.summary.recommendations.contains(&"Investigate drift detection results".to_string()));
    // performance (0.9 baseline vs 0.75 over both days) and drift both alert
    assert_eq!(report.summary.alerts_triggered, 2);
}

#[tokio::test]
async fn test_monitoring_report_unhealthy_wins_over_drift() {
    let f = fixture(OverallStatus::Unhealthy);
    f.log_day(today() - chrono::Duration::days(1), 10, 0);
    f.log_day(today(), 5, 5);
    let (report, _) = f.orchestrator.generate_monitoring_report().await.unwrap();
    assert_eq!(report.overall_status, OverallStatus::Unhealthy);
}

#[tokio::test]
async fn test_monitoring_report_survives_stalled_sub_check() {
    let f = fixture_with(Arc::new(SlowProbe), |c| c.monitoring.cycle_soft_deadline_secs = 1);
    f.promote_production(0.9);
    let (report, path) = f.orchestrator.generate_monitoring_report().await.unwrap();
    assert!(path.exists());
    assert_eq!(report.overall_status, OverallStatus::Degraded);
    let Section::Failed(failure) = &report.health_check else { panic!("expected failed health check") };
    assert_eq!(failure.status, FailureKind::TimedOut);
    assert!(report.data_quality.completed().is_some());
}

#[tokio::test]
async fn test_monitoring_report_survives_panicking_sub_check() {
    let f = fixture_with(Arc::new(PanickingProbe), |_| {});
    let (report, _) = f.orchestrator.generate_monitoring_report().await.unwrap();
    let Section::Failed(failure) = &report.health_check else { panic!("expected failed health check") };
    assert_eq!(failure.status, FailureKind::Panicked);
    assert!(report.performance_monitoring.completed().is_some());
    assert!(report.summary.recommendations.contains(&"Re-run the health_check check".to_string()));
}

#[tokio::test]
async fn test_consecutive_cycles_write_distinct_reports() {
    let f = fixture(OverallStatus::Healthy);
    let (_, first) = f.orchestrator.generate_monitoring_report().await.unwrap();
    let (_, second) = f.orchestrator.generate_monitoring_report().await.unwrap();
    assert_ne!(first, second);
    let listed = f.orchestrator.report_writer().list(ReportKind::Monitoring).unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn test_scheduler_from_config_registers_both_tasks() {
    let f = fixture(OverallStatus::Healthy);
    let scheduler = f.orchestrator.scheduler().unwrap();
    assert_eq!(scheduler.task_names(), vec!["monitoring_report", "drift_monitoring"]);
}

// =============================================================================
// Report assembly
// =============================================================================

fn quality() -> Section<QualitySummary> {
    Section::Completed(QualitySummary { timestamp: chrono::Utc::now(), status: QualityStatus::Passed, checks_performed: 0 })
}

fn drift(detected: bool) -> Section<DriftMonitoringSummary> {
    Section::Completed(DriftMonitoringSummary {
        timestamp: chrono::Utc::now(),
        drift_detected: detected,
        models: Default::default(),
    })
}

fn health(api: ProbeOutcome) -> Section<HealthStatus> {
    Section::Completed(HealthStatus::from_checks(HealthChecks {
        api,
        tracking: ProbeOutcome::healthy(),
        models: Default::default(),
    }))
}

fn performance() -> Section<PerformanceReport> {
    Section::Completed(PerformanceReport { timestamp: chrono::Utc::now(), models: Default::default() })
}

#[test]
fn test_overall_status_derivation() {
    let assemble = |h, d| MonitoringReport::assemble(vec![], h, performance(), d, quality()).overall_status;
    assert_eq!(assemble(health(ProbeOutcome::healthy()), drift(false)), OverallStatus::Healthy);
    assert_eq!(assemble(health(ProbeOutcome::healthy()), drift(true)), OverallStatus::Degraded);
    assert_eq!(assemble(health(ProbeOutcome::unhealthy("x")), drift(false)), OverallStatus::Unhealthy);
    assert_eq!(assemble(health(ProbeOutcome::unhealthy("x")), drift(true)), OverallStatus::Unhealthy);

    let failed = Section::Failed(SectionFailure { status: FailureKind::TimedOut, error: "late".to_string() });
    assert_eq!(assemble(health(ProbeOutcome::healthy()), failed), OverallStatus::Degraded);
}

#[test]
fn test_report_section_round_trips() {
    let report = MonitoringReport::assemble(
        vec![MODEL.to_string()],
        health(ProbeOutcome::healthy()),
        performance(),
        Section::Failed(SectionFailure { status: FailureKind::Panicked, error: "boom".to_string() }),
        quality(),
    );
    let json = serde_json::to_string(&report).unwrap();
    let back: MonitoringReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert!(back.drift_monitoring.is_failed());
}
