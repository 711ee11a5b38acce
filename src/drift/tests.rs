//! Tests for drift detection module.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;

use super::*;
use crate::config::DriftDetectionConfig;
use crate::predictions::{PredictionLog, PredictionLogEntry};
use crate::report::{ReportKind, ReportWriter};

fn detector(dir: &std::path::Path) -> DriftDetector {
    DriftDetector::new(DriftDetectionConfig::default(), dir)
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

/// Append `total` rows for `model` on `day`, `correct` of them right
fn write_day(log: &PredictionLog, model: &str, day: NaiveDate, correct: usize, total: usize) {
    let rows: Vec<_> = (0..total)
        .map(|i| PredictionLogEntry::new("billing", if i < correct { "billing" } else { "support" }))
        .collect();
    log.append(model, day, &rows).unwrap();
}

fn features(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Statistical functions
// ---------------------------------------------------------------------------

#[test]
fn test_drift_test_name() {
    assert_eq!(DriftTest::KolmogorovSmirnov.name(), "Kolmogorov-Smirnov");
    assert_eq!(DriftTest::ChiSquare.name(), "Chi-square");
    assert_eq!(serde_json::to_string(&DriftTest::ChiSquare).unwrap(), "\"Chi-square\"");
}

#[test]
fn test_ks_statistic_disjoint_samples() {
    assert_eq!(ks_statistic(&[1.0; 5], &[5.0; 5]), 1.0);
    assert_eq!(ks_statistic(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    assert_eq!(ks_statistic(&[], &[1.0]), 0.0);
}

#[test]
fn test_ks_two_sample_constant_columns() {
    let (d, p) = ks_two_sample(&[1.0; 5], &[5.0; 5]);
    assert_eq!(d, 1.0);
    assert!(p < 0.05, "p = {p}");
}

#[test]
fn test_ks_p_value_limits() {
    assert_eq!(ks_p_value(0.0), 1.0);
    assert!(ks_p_value(3.0) < 1e-6);
    assert!((ks_p_value(1.36) - 0.05).abs() < 0.005);
}

#[test]
fn test_chi_square_p_value_known_values() {
    // df = 2: Q = exp(-x/2)
    assert!((chi_square_p_value(4.0, 2) - (-2.0f64).exp()).abs() < 1e-9);
    // df = 1 critical value at 0.05
    assert!((chi_square_p_value(3.841, 1) - 0.05).abs() < 1e-3);
    // df = 10 critical value at 0.05
    assert!((chi_square_p_value(18.307, 10) - 0.05).abs() < 1e-3);
    // Far tail stays positive and tiny
    let far = chi_square_p_value(200.0, 3);
    assert!(far > 0.0 && far < 1e-40);
    assert_eq!(chi_square_p_value(0.0, 3), 1.0);
    assert_eq!(chi_square_p_value(5.0, 0), 1.0);
}

#[test]
fn test_chi_square_homogeneity_union_of_categories() {
    let reference = BTreeMap::from([("a".to_string(), 50), ("b".to_string(), 50)]);
    let current = BTreeMap::from([("a".to_string(), 50), ("c".to_string(), 50)]);
    let (stat, p) = chi_square_homogeneity(&reference, &current);
    assert!(stat > 50.0);
    assert!(p < 1e-6);

    let (stat, p) = chi_square_homogeneity(&reference, &reference);
    assert_eq!(stat, 0.0);
    assert_eq!(p, 1.0);

    let single = BTreeMap::from([("a".to_string(), 10)]);
    assert_eq!(chi_square_homogeneity(&single, &single), (0.0, 1.0));
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[test]
fn test_cell_parse() {
    assert_eq!(Cell::parse("3.5"), Cell::Number(3.5));
    assert_eq!(Cell::parse(" NA "), Cell::Missing);
    assert_eq!(Cell::parse(""), Cell::Missing);
    assert_eq!(Cell::parse("NaN"), Cell::Missing);
    assert_eq!(Cell::parse("billing"), Cell::Text("billing".to_string()));
}

#[test]
fn test_dataset_from_csv() {
    let csv = "email_length,intent\n120,billing\n,support\n80\n";
    let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
    let lengths = ds.column("email_length").unwrap();
    assert_eq!(lengths, &[Cell::Number(120.0), Cell::Missing, Cell::Number(80.0)]);
    assert_eq!(ds.column("intent").unwrap()[2], Cell::Missing);
    assert!(ds.column("absent").is_none());
}

// ---------------------------------------------------------------------------
// detect_data_drift
// ---------------------------------------------------------------------------

#[test]
fn test_numeric_column_uses_ks() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Dataset::new().with_column("x", [1.0; 5]);
    let current = Dataset::new().with_column("x", [5.0; 5]);
    let results = detector(dir.path()).detect_data_drift(&reference, &current, &features(&["x"]));

    let report = &results["x"];
    assert_eq!(report.test, DriftTest::KolmogorovSmirnov);
    assert!(report.drift_detected);
    assert!(report.p_value < 0.05);
}

#[test]
fn test_identical_numeric_columns_do_not_drift() {
    let dir = tempfile::tempdir().unwrap();
    let values: Vec<f64> = (0..100).map(f64::from).collect();
    let ds = Dataset::new().with_column("x", values);
    let results = detector(dir.path()).detect_data_drift(&ds, &ds, &features(&["x"]));
    assert!(!results["x"].drift_detected);
    assert_eq!(results["x"].p_value, 1.0);
}

#[test]
fn test_text_column_uses_chi_square() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Dataset::new().with_column("intent", vec!["billing"; 40].into_iter().chain(vec!["support"; 40]));
    let current = Dataset::new().with_column("intent", vec!["billing"; 10].into_iter().chain(vec!["refund"; 70]));
    let results =
        detector(dir.path()).detect_data_drift(&reference, &current, &features(&["intent"]));
    assert_eq!(results["intent"].test, DriftTest::ChiSquare);
    assert!(results["intent"].drift_detected);
}

#[test]
fn test_mixed_column_is_categorical() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Dataset::from_csv_reader("f\n1\n2\n".as_bytes()).unwrap();
    let current = Dataset::from_csv_reader("f\n1\nhigh\n".as_bytes()).unwrap();
    let results = detector(dir.path()).detect_data_drift(&reference, &current, &features(&["f"]));
    assert_eq!(results["f"].test, DriftTest::ChiSquare);
}

#[test]
fn test_absent_or_empty_columns_are_not_reported() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Dataset::new().with_column("x", [1.0, 2.0]).with_column("y", [1.0]);
    let current = Dataset::new().with_column("y", [f64::NAN, f64::NAN]);
    let results =
        detector(dir.path()).detect_data_drift(&reference, &current, &features(&["x", "y", "z"]));
    assert!(results.is_empty());
}

// ---------------------------------------------------------------------------
// detect_model_drift
// ---------------------------------------------------------------------------

#[test]
fn test_model_drift_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path());
    write_day(&log, "intent_classifier", date(10), 90, 100);
    write_day(&log, "intent_classifier", date(11), 90, 100);
    write_day(&log, "intent_classifier", date(12), 81, 100);

    let report = detector(dir.path())
        .detect_model_drift_at("intent_classifier", None, date(12))
        .unwrap()
        .unwrap();
    assert!((report.baseline_accuracy - 0.90).abs() < 1e-9);
    assert!((report.current_accuracy - 0.81).abs() < 1e-9);
    assert!((report.performance_drop - 0.09).abs() < 1e-9);
    assert!(!report.drift_detected);
    assert_eq!(report.daily_metrics.len(), 3);
}

#[test]
fn test_model_drift_above_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path());
    write_day(&log, "intent_classifier", date(10), 90, 100);
    write_day(&log, "intent_classifier", date(12), 79, 100);

    let report = detector(dir.path())
        .detect_model_drift_at("intent_classifier", None, date(12))
        .unwrap()
        .unwrap();
    assert!((report.performance_drop - 0.11).abs() < 1e-9);
    assert!(report.drift_detected);
}

#[test]
fn test_model_improvement_never_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path());
    write_day(&log, "m", date(10), 50, 100);
    write_day(&log, "m", date(11), 99, 100);
    let report = detector(dir.path()).detect_model_drift_at("m", None, date(11)).unwrap().unwrap();
    assert!(report.performance_drop < 0.0);
    assert!(!report.drift_detected);
}

#[test]
fn test_model_drift_single_day_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path());
    write_day(&log, "m", date(12), 90, 100);
    assert!(detector(dir.path()).detect_model_drift_at("m", None, date(12)).unwrap().is_none());
}

#[test]
fn test_model_drift_window_and_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path());
    // Outside a 7 day window ending on the 20th
    write_day(&log, "m", date(1), 90, 100);
    write_day(&log, "m", date(20), 50, 100);
    // Malformed and empty logs inside the window
    std::fs::write(dir.path().join("m_20260315.csv"), "true,predicted,timestamp\na\n").unwrap();
    log.append("m", date(16), &[]).unwrap();
    std::fs::write(dir.path().join("m_latest.csv"), "garbage").unwrap();

    let d = detector(dir.path());
    assert!(d.detect_model_drift_at("m", None, date(20)).unwrap().is_none());
    // A wider window reaches the first day
    let report = d.detect_model_drift_at("m", Some(30), date(20)).unwrap().unwrap();
    assert_eq!(report.window_days, 30);
    assert!(report.drift_detected);
}

#[test]
fn test_model_drift_missing_dir_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let d = detector(&dir.path().join("nope"));
    assert!(d.detect_model_drift_at("m", None, date(12)).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// generate_drift_report
// ---------------------------------------------------------------------------

#[test]
fn test_generate_drift_report() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::new(dir.path().join("predictions"));
    write_day(&log, "m", date(10), 90, 100);
    write_day(&log, "m", date(11), 70, 100);
    let d = detector(&dir.path().join("predictions"));

    let model = d.detect_model_drift_at("m", None, date(11)).unwrap();
    let reference = Dataset::new().with_column("x", [1.0; 5]);
    let current = Dataset::new().with_column("x", [5.0; 5]);
    let data = d.detect_data_drift(&reference, &current, &features(&["x"]));

    let writer = ReportWriter::new(dir.path().join("reports"));
    let (document, path) = d
        .generate_drift_report(&writer, Some(data), BTreeMap::from([("m".to_string(), model)]))
        .unwrap();
    assert!(document.summary.has_drift());
    assert_eq!(document.summary.models_drifted, 1);
    assert_eq!(writer.list(ReportKind::Drift).unwrap(), vec![path.clone()]);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["data_drift"]["x"]["test"], "Kolmogorov-Smirnov");
    assert_eq!(json["model_drift"]["m"]["daily_metrics"][0]["date"], "2026-03-10");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_ks_bounds(
        a in prop::collection::vec(-100.0f64..100.0, 1..50),
        b in prop::collection::vec(-100.0f64..100.0, 1..50),
    ) {
        let (d, p) = ks_two_sample(&a, &b);
        prop_assert!((0.0..=1.0).contains(&d));
        prop_assert!((0.0..=1.0).contains(&p));
        // Symmetric in its arguments
        prop_assert!((ks_statistic(&b, &a) - d).abs() < 1e-12);
    }

    #[test]
    fn prop_chi_square_p_monotone(x in 0.1f64..50.0, dx in 0.1f64..10.0, df in 1usize..20) {
        prop_assert!(chi_square_p_value(x + dx, df) <= chi_square_p_value(x, df) + 1e-12);
    }
}
