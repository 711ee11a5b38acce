//! Type definitions for drift detection.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::predictions::ClassificationMetrics;

/// Statistical test used for one check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftTest {
    /// Two-sample Kolmogorov-Smirnov (numeric features)
    #[serde(rename = "Kolmogorov-Smirnov")]
    KolmogorovSmirnov,
    /// Chi-square homogeneity over category counts (categorical features)
    #[serde(rename = "Chi-square")]
    ChiSquare,
}

impl DriftTest {
    /// Get the name of this test
    pub fn name(&self) -> &'static str {
        match self {
            DriftTest::KolmogorovSmirnov => "Kolmogorov-Smirnov",
            DriftTest::ChiSquare => "Chi-square",
        }
    }
}

/// Data drift verdict for one feature column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub feature: String,
    pub test: DriftTest,
    pub statistic: f64,
    pub p_value: f64,
    pub drift_detected: bool,
}

/// Metrics of one day of prediction logs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: ClassificationMetrics,
}

/// Performance drift verdict for one model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDriftReport {
    pub model_name: String,
    pub window_days: u32,
    /// Mean accuracy of every day but the most recent
    pub baseline_accuracy: f64,
    /// Accuracy of the most recent day
    pub current_accuracy: f64,
    /// `baseline_accuracy - current_accuracy`
    pub performance_drop: f64,
    pub threshold: f64,
    pub drift_detected: bool,
    pub daily_metrics: Vec<DailyMetrics>,
}

/// Counts over one drift report
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub features_checked: usize,
    pub features_drifted: usize,
    pub models_checked: usize,
    pub models_drifted: usize,
}

impl DriftSummary {
    /// Whether any feature or model drifted
    pub fn has_drift(&self) -> bool {
        self.features_drifted > 0 || self.models_drifted > 0
    }
}

/// Document persisted as `drift_report_*.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftReportDocument {
    pub timestamp: DateTime<Utc>,
    pub data_drift: Option<BTreeMap<String, DriftReport>>,
    pub model_drift: BTreeMap<String, Option<ModelDriftReport>>,
    pub summary: DriftSummary,
}

impl DriftReportDocument {
    pub fn new(
        data_drift: Option<BTreeMap<String, DriftReport>>,
        model_drift: BTreeMap<String, Option<ModelDriftReport>>,
    ) -> Self {
        let features = data_drift.as_ref().map(|d| d.values().collect::<Vec<_>>()).unwrap_or_default();
        let models: Vec<_> = model_drift.values().flatten().collect();
        let summary = DriftSummary {
            features_checked: features.len(),
            features_drifted: features.iter().filter(|r| r.drift_detected).count(),
            models_checked: models.len(),
            models_drifted: models.iter().filter(|r| r.drift_detected).count(),
        };
        Self { timestamp: Utc::now(), data_drift, model_drift, summary }
    }
}
