//! Shared numeric helpers.
//!
//! Every division in the crate goes through [`ratio`], so no `NaN` or
//! infinity ever reaches the output records.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Zero-guarded ratio: `numerator / denominator` when the denominator is
/// strictly positive, otherwise `0`.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        guard(numerator / denominator)
    } else {
        0.0
    }
}

/// Replace a non-finite result with `0`.
pub fn guard(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn clamp_pct(value: f64) -> f64 {
    guard(value).clamp(0.0, 100.0)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    guard(values.mean())
}

/// Population standard deviation (divides by `n`), `0` for fewer than two
/// values.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    guard(values.population_std_dev())
}

pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    guard(values.population_variance())
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Summary statistics over the finite subset of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    /// std_dev / mean * 100, `0` when the mean is not positive
    pub coefficient_of_variation: f64,
}

pub fn summarize(values: &[f64]) -> SummaryStatistics {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return SummaryStatistics {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            std_dev: 0.0,
            coefficient_of_variation: 0.0,
        };
    }

    let sum: f64 = finite.iter().sum();
    let avg = mean(&finite);
    let std_dev = population_std_dev(&finite);
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SummaryStatistics {
        count: finite.len(),
        sum,
        mean: avg,
        median: median(&finite),
        min,
        max,
        std_dev,
        coefficient_of_variation: ratio(std_dev, avg) * 100.0,
    }
}
