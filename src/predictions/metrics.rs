//! Classification metrics over prediction log entries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PredictionLogEntry;

/// Accuracy plus support-weighted precision, recall and F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Default)]
struct LabelCounts {
    true_positive: usize,
    actual: usize,
    predicted: usize,
}

impl ClassificationMetrics {
    /// `None` for an empty slice.
    ///
    /// Per-label scores with a zero denominator count as 0, and each label
    /// is weighted by its share of true labels.
    pub fn compute(entries: &[PredictionLogEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let n = entries.len() as f64;

        let mut labels: BTreeMap<&str, LabelCounts> = BTreeMap::new();
        let mut correct = 0usize;
        for e in entries {
            labels.entry(&e.true_label).or_default().actual += 1;
            labels.entry(&e.predicted).or_default().predicted += 1;
            if e.is_correct() {
                correct += 1;
                labels.entry(&e.true_label).or_default().true_positive += 1;
            }
        }

        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
        for counts in labels.values() {
            if counts.actual == 0 {
                continue;
            }
            let weight = counts.actual as f64 / n;
            let tp = counts.true_positive as f64;
            let p = if counts.predicted == 0 { 0.0 } else { tp / counts.predicted as f64 };
            let r = tp / counts.actual as f64;
            let f = if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) };
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }

        Some(Self { accuracy: correct as f64 / n, precision, recall, f1_score: f1, support: entries.len() })
    }
}
