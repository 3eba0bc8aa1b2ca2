//! Z-score outlier and anomaly detection.

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::stats::{mean, population_std_dev};
use crate::types::SeriesPoint;

/// Fewest numeric values for which outliers are looked for.
const MIN_OUTLIER_SAMPLE: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub outliers: Vec<Outlier>,
    /// Indices of missing or non-finite values, left out of the statistics
    pub excluded: Vec<usize>,
    pub numeric_count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub value: f64,
    /// Series mean
    pub expected: f64,
    pub deviation: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Flag values whose `|z|` exceeds `threshold`.
///
/// Statistics use only the finite values; the positions of the others are
/// reported in `excluded` rather than read as zero. Fewer than three numeric
/// values, or zero spread, yields no outliers.
pub fn detect_outliers(values: &[Option<f64>], threshold: f64) -> OutlierReport {
    let mut excluded = Vec::new();
    let mut numeric = Vec::new();
    for (index, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => numeric.push((index, *v)),
            _ => excluded.push(index),
        }
    }

    let sample: Vec<f64> = numeric.iter().map(|(_, v)| *v).collect();
    let avg = mean(&sample);
    let std_dev = population_std_dev(&sample);

    let outliers = if sample.len() < MIN_OUTLIER_SAMPLE {
        Vec::new()
    } else {
        numeric
            .iter()
            .filter_map(|&(index, value)| {
                let z_score = z_score(value, avg, std_dev);
                (z_score > threshold).then_some(Outlier {
                    index,
                    value,
                    z_score,
                })
            })
            .collect()
    };

    if !excluded.is_empty() {
        tracing::debug!(excluded = excluded.len(), "non-numeric values left out of outlier statistics");
    }

    OutlierReport {
        outliers,
        excluded,
        numeric_count: sample.len(),
        mean: avg,
        std_dev,
    }
}

/// Points of a series more than `config.outlier_z_threshold` standard
/// deviations from its mean.
///
/// Needs `config.anomaly_min_points` points. Severity is high beyond
/// `config.anomaly_high_z`.
pub fn detect_anomalies(series: &[SeriesPoint], config: &AnalyticsConfig) -> Vec<Anomaly> {
    if series.len() < config.anomaly_min_points {
        return Vec::new();
    }
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let avg = mean(&values);
    let std_dev = population_std_dev(&values);

    series
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let z = z_score(point.value, avg, std_dev);
            (z > config.outlier_z_threshold).then(|| Anomaly {
                index,
                period: point.period.clone(),
                year: point.year,
                month: point.month,
                value: point.value,
                expected: avg,
                deviation: point.value - avg,
                z_score: z,
                severity: if z > config.anomaly_high_z {
                    AnomalySeverity::High
                } else {
                    AnomalySeverity::Medium
                },
            })
        })
        .collect()
}

fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        (value - mean).abs() / std_dev
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
