//! Statistical helper functions for drift detection.

use std::collections::BTreeMap;

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Two-sample Kolmogorov-Smirnov statistic: the largest gap between the
/// empirical CDFs, evaluated at every distinct observed value.
pub fn ks_statistic(reference: &[f64], current: &[f64]) -> f64 {
    if reference.is_empty() || current.is_empty() {
        return 0.0;
    }
    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n, m) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }
    d
}

/// Two-sample KS test returning `(statistic, p_value)`.
///
/// The p-value is the asymptotic Kolmogorov tail evaluated at
/// `(sqrt(ne) + 0.12 + 0.11 / sqrt(ne)) * D` with `ne = n*m / (n+m)`.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> (f64, f64) {
    let d = ks_statistic(reference, current);
    if reference.is_empty() || current.is_empty() {
        return (d, 1.0);
    }
    let (n, m) = (reference.len() as f64, current.len() as f64);
    let en = (n * m / (n + m)).sqrt();
    (d, ks_p_value((en + 0.12 + 0.11 / en) * d))
}

/// Approximate p-value for KS statistic using Kolmogorov distribution
pub fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    // Q(λ) = 2 * sum_{k=1}^∞ (-1)^{k+1} * exp(-2 * k^2 * λ^2)
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Chi-square test of homogeneity between two category frequency tables.
///
/// Categories are the union of both sides; a category missing from one side
/// counts as zero there. Returns `(statistic, p_value)`, and `(0.0, 1.0)`
/// when fewer than two categories exist.
pub fn chi_square_homogeneity(
    reference: &BTreeMap<String, usize>,
    current: &BTreeMap<String, usize>,
) -> (f64, f64) {
    let categories: Vec<&String> = {
        let mut keys: Vec<&String> = reference.keys().chain(current.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    };
    let ref_total: usize = reference.values().sum();
    let cur_total: usize = current.values().sum();
    if categories.len() < 2 || ref_total == 0 || cur_total == 0 {
        return (0.0, 1.0);
    }
    let total = (ref_total + cur_total) as f64;

    let mut statistic = 0.0;
    for category in &categories {
        let observed_ref = reference.get(*category).copied().unwrap_or(0) as f64;
        let observed_cur = current.get(*category).copied().unwrap_or(0) as f64;
        let column = observed_ref + observed_cur;
        for (observed, row) in [(observed_ref, ref_total), (observed_cur, cur_total)] {
            let expected = row as f64 * column / total;
            if expected > 0.0 {
                statistic += (observed - expected).powi(2) / expected;
            }
        }
    }
    let df = categories.len() - 1;
    (statistic, chi_square_p_value(statistic, df))
}

/// Upper-tail chi-square probability, the survival function at `chi_sq`
pub fn chi_square_p_value(chi_sq: f64, df: usize) -> f64 {
    if df == 0 || chi_sq <= 0.0 {
        return 1.0;
    }
    ChiSquared::new(df as f64)
        .map(|dist| dist.sf(chi_sq).clamp(0.0, 1.0))
        .unwrap_or(1.0)
}
