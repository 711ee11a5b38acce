//! Promotion thresholds for automated promotion

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::comparison::{Comparison, MetricRequirement};

/// All-or-nothing metric gate for automated promotion
///
/// Requirements are evaluated in insertion order and evaluation stops at
/// the first failure. A metric missing from the candidate counts as a
/// failure, never as a skip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionPolicy {
    /// Required metrics with thresholds
    pub required_metrics: Vec<MetricRequirement>,
}

impl PromotionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy requiring `metric >= threshold` for every entry, ordered by metric name
    pub fn from_thresholds(thresholds: &HashMap<String, f64>) -> Self {
        let mut names: Vec<_> = thresholds.keys().collect();
        names.sort();
        names.into_iter().fold(Self::new(), |policy, name| {
            policy.require_metric(name, Comparison::Gte, thresholds[name])
        })
    }

    /// Add a metric requirement
    pub fn require_metric(mut self, name: &str, comparison: Comparison, threshold: f64) -> Self {
        self.required_metrics.push(MetricRequirement {
            name: name.to_string(),
            comparison,
            threshold,
        });
        self
    }

    /// Check candidate metrics, stopping at the first unmet requirement
    pub fn check(&self, metrics: &impl MetricSource) -> PolicyCheckResult {
        for req in &self.required_metrics {
            let Some(value) = metrics.metric(&req.name) else {
                let reason = format!("Missing required metric '{}'", req.name);
                return PolicyCheckResult::failed(&req.name, reason);
            };
            if !req.comparison.check(value, req.threshold) {
                return PolicyCheckResult::failed(
                    &req.name,
                    format!(
                        "Metric '{}' = {} does not satisfy {} {}",
                        req.name,
                        value,
                        req.comparison.as_str(),
                        req.threshold
                    ),
                );
            }
        }
        PolicyCheckResult { passed: true, failed_metric: None, reason: None }
    }
}

/// Lookup of a named metric value
pub trait MetricSource {
    fn metric(&self, name: &str) -> Option<f64>;
}

impl MetricSource for HashMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricSource for std::collections::BTreeMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Result of policy check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCheckResult {
    /// Whether all requirements passed
    pub passed: bool,
    /// First metric that failed or was missing
    pub failed_metric: Option<String>,
    pub reason: Option<String>,
}

impl PolicyCheckResult {
    fn failed(metric: &str, reason: String) -> Self {
        Self { passed: false, failed_metric: Some(metric.to_string()), reason: Some(reason) }
    }
}
