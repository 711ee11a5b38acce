//! Version comparison and metric comparison types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metrics and creation time of one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: u32,
    pub metrics: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

/// Comparison between two model versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub model_name: String,
    pub version1: VersionSnapshot,
    pub version2: VersionSnapshot,
    /// `metrics[version2] - metrics[version1]` for metrics present in both
    pub metric_differences: BTreeMap<String, f64>,
}

impl VersionComparison {
    /// Build a comparison; metrics present on only one side are omitted
    pub fn between(model_name: &str, version1: VersionSnapshot, version2: VersionSnapshot) -> Self {
        let metric_differences = version1
            .metrics
            .iter()
            .filter_map(|(name, v1)| version2.metrics.get(name).map(|v2| (name.clone(), v2 - v1)))
            .collect();

        Self { model_name: model_name.to_string(), version1, version2, metric_differences }
    }
}

/// Metric requirement for promotion policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRequirement {
    /// Metric name
    pub name: String,
    /// Comparison operator
    pub comparison: Comparison,
    /// Threshold value
    pub threshold: f64,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Check if value satisfies comparison with threshold
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Gt => value > threshold,
            Comparison::Gte => value >= threshold,
            Comparison::Lt => value < threshold,
            Comparison::Lte => value <= threshold,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_comparison_consistent(value in -1000.0f64..1000.0, threshold in -1000.0f64..1000.0) {
            // Gt and Lte are complementary
            let gt = Comparison::Gt.check(value, threshold);
            let lte = Comparison::Lte.check(value, threshold);
            prop_assert!(gt != lte);
        }
    }
}
