//! Drift detector implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Days, Local, NaiveDate};

use super::dataset::{Cell, Dataset};
use super::statistical::{chi_square_homogeneity, ks_two_sample};
use super::types::{DailyMetrics, DriftReport, DriftReportDocument, DriftTest, ModelDriftReport};
use super::Result;
use crate::config::DriftDetectionConfig;
use crate::predictions::{read_entries, ClassificationMetrics, PredictionLogIndex};
use crate::report::{ReportKind, ReportWriter};

/// Data and model drift detection over datasets and prediction logs
#[derive(Debug, Clone)]
pub struct DriftDetector {
    config: DriftDetectionConfig,
    predictions_dir: PathBuf,
}

impl DriftDetector {
    pub fn new(config: DriftDetectionConfig, predictions_dir: impl Into<PathBuf>) -> Self {
        Self { config, predictions_dir: predictions_dir.into() }
    }

    pub fn config(&self) -> &DriftDetectionConfig {
        &self.config
    }

    pub fn predictions_dir(&self) -> &Path {
        &self.predictions_dir
    }

    /// Test each requested feature present in both datasets.
    ///
    /// Columns missing from either side, or with no non-missing values on
    /// either side, produce no entry.
    pub fn detect_data_drift(
        &self,
        reference: &Dataset,
        current: &Dataset,
        feature_columns: &[String],
    ) -> BTreeMap<String, DriftReport> {
        let mut results = BTreeMap::new();
        for feature in feature_columns {
            let (Some(ref_col), Some(cur_col)) = (reference.column(feature), current.column(feature))
            else {
                tracing::debug!(feature = %feature, "Feature absent from a dataset, skipping");
                continue;
            };
            let ref_values: Vec<&Cell> = ref_col.iter().filter(|c| !c.is_missing()).collect();
            let cur_values: Vec<&Cell> = cur_col.iter().filter(|c| !c.is_missing()).collect();
            if ref_values.is_empty() || cur_values.is_empty() {
                tracing::debug!(feature = %feature, "Feature has no values on one side, skipping");
                continue;
            }

            let report = self.test_feature(feature, &ref_values, &cur_values);
            if report.drift_detected {
                tracing::warn!(feature = %feature, test = report.test.name(), p_value = report.p_value, "Data drift detected");
            }
            results.insert(feature.clone(), report);
        }
        results
    }

    fn test_feature(&self, feature: &str, reference: &[&Cell], current: &[&Cell]) -> DriftReport {
        let numbers = |cells: &[&Cell]| -> Option<Vec<f64>> {
            cells.iter().map(|c| if let Cell::Number(v) = c { Some(*v) } else { None }).collect()
        };

        let (test, (statistic, p_value)) = match (numbers(reference), numbers(current)) {
            (Some(a), Some(b)) => (DriftTest::KolmogorovSmirnov, ks_two_sample(&a, &b)),
            _ => (DriftTest::ChiSquare, chi_square_homogeneity(&counts(reference), &counts(current))),
        };
        DriftReport {
            feature: feature.to_string(),
            test,
            statistic,
            p_value,
            drift_detected: p_value < self.config.data_drift_threshold,
        }
    }

    /// Model performance drift over the window ending today
    pub fn detect_model_drift(&self, model_name: &str, window_days: Option<u32>) -> Result<Option<ModelDriftReport>> {
        self.detect_model_drift_at(model_name, window_days, Local::now().date_naive())
    }

    /// Model performance drift over logs dated `[today - window_days, today]`.
    ///
    /// Returns `None` when fewer than two days have readable, non-empty logs.
    pub fn detect_model_drift_at(
        &self,
        model_name: &str,
        window_days: Option<u32>,
        today: NaiveDate,
    ) -> Result<Option<ModelDriftReport>> {
        let window_days = window_days.unwrap_or(self.config.monitoring_window_days);
        let from = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        let index = PredictionLogIndex::scan(&self.predictions_dir)?;

        let mut daily_metrics = Vec::new();
        for file in index.in_range(model_name, from, today) {
            let entries = match read_entries(&file.path) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Skipping unreadable prediction log");
                    continue;
                }
            };
            match ClassificationMetrics::compute(&entries) {
                Some(metrics) => daily_metrics.push(DailyMetrics { date: file.date, metrics }),
                None => tracing::debug!(path = %file.path.display(), "Prediction log has no rows"),
            }
        }

        let Some((current, history)) = daily_metrics.split_last().filter(|(_, h)| !h.is_empty()) else {
            tracing::info!(model = model_name, days = daily_metrics.len(), "Insufficient data for model drift detection");
            return Ok(None);
        };
        let baseline_accuracy =
            history.iter().map(|d| d.metrics.accuracy).sum::<f64>() / history.len() as f64;
        let current_accuracy = current.metrics.accuracy;
        let performance_drop = baseline_accuracy - current_accuracy;
        let threshold = self.config.performance_drift_threshold;
        let drift_detected = performance_drop > threshold;

        if drift_detected {
            tracing::warn!(
                model = model_name,
                baseline = baseline_accuracy,
                current = current_accuracy,
                drop = performance_drop,
                "Model drift detected"
            );
        }

        Ok(Some(ModelDriftReport {
            model_name: model_name.to_string(),
            window_days,
            baseline_accuracy,
            current_accuracy,
            performance_drop,
            threshold,
            drift_detected,
            daily_metrics,
        }))
    }

    /// Persist data and model drift results as one drift report
    pub fn generate_drift_report(
        &self,
        writer: &ReportWriter,
        data_drift: Option<BTreeMap<String, DriftReport>>,
        model_drift: BTreeMap<String, Option<ModelDriftReport>>,
    ) -> Result<(DriftReportDocument, PathBuf)> {
        let document = DriftReportDocument::new(data_drift, model_drift);
        let path = writer.write(ReportKind::Drift, &document)?;
        Ok((document, path))
    }
}

fn counts(cells: &[&Cell]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in cells.iter().filter_map(|c| c.label()) {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
