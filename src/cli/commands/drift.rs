//! Drift command implementation

use std::collections::BTreeMap;

use super::CommandOutcome;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{DriftArgs, MonitoringConfig};
use crate::drift::{Dataset, DriftDetector};
use crate::report::ReportWriter;

/// Check data drift (when both datasets are given) and model drift, write a
/// drift report, and signal drift through the outcome
pub fn run_drift(config: &MonitoringConfig, args: DriftArgs, level: LogLevel) -> crate::Result<CommandOutcome> {
    let detector = DriftDetector::new(config.drift_detection.clone(), config.paths.predictions_dir.clone());

    let data_drift = match (&args.reference_data, &args.current_data) {
        (Some(reference), Some(current)) => {
            log(level, LogLevel::Verbose, &format!("Reference data: {}", reference.display()));
            log(level, LogLevel::Verbose, &format!("Current data: {}", current.display()));
            let reference = Dataset::from_csv_path(reference)?;
            let current = Dataset::from_csv_path(current)?;
            Some(detector.detect_data_drift(&reference, &current, &args.features))
        }
        _ => None,
    };

    let model_drift = detector.detect_model_drift(&args.model, args.window_days)?;
    match &model_drift {
        Some(report) => log(
            level,
            LogLevel::Normal,
            &format!(
                "{}: baseline accuracy {:.3}, current {:.3}, drop {:.3} (threshold {:.3})",
                report.model_name,
                report.baseline_accuracy,
                report.current_accuracy,
                report.performance_drop,
                report.threshold
            ),
        ),
        None => log(level, LogLevel::Normal, &format!("{}: not enough prediction logs for a verdict", args.model)),
    }
    if let Some(features) = &data_drift {
        for report in features.values() {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "{}: {} statistic {:.4}, p-value {:.4}{}",
                    report.feature,
                    report.test.name(),
                    report.statistic,
                    report.p_value,
                    if report.drift_detected { " (drift)" } else { "" }
                ),
            );
        }
    }

    let writer = ReportWriter::new(config.paths.reports_dir.clone());
    let model_drift = BTreeMap::from([(args.model.clone(), model_drift)]);
    let (document, path) = detector.generate_drift_report(&writer, data_drift, model_drift)?;
    log(level, LogLevel::Normal, &format!("Drift report saved to {}", path.display()));

    if document.summary.has_drift() {
        log(level, LogLevel::Normal, "Drift detected");
        Ok(CommandOutcome::DriftDetected)
    } else {
        Ok(CommandOutcome::Completed)
    }
}
