use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::stats::{guard, mean, population_std_dev, ratio};
use crate::types::{Percent, SeriesPoint};

/// Slope magnitude below which a fitted line counts as flat.
const FLAT_SLOPE: f64 = 0.01;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Stable,
    Increasing,
    RapidlyIncreasing,
    Decreasing,
    RapidlyDecreasing,
    NoBaseline,
    InsufficientData,
}

/// First-to-last comparison of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleTrend {
    pub direction: TrendDirection,
    pub status: TrendStatus,
    /// Rounded magnitude of the change
    pub percentage: f64,
    pub raw_percentage: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitConfidence {
    High,
    Medium,
    Low,
}

/// Least-squares line over `(index, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    pub confidence: FitConfidence,
}

impl LinearTrend {
    /// Fitted value at `index`.
    pub fn value_at(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariabilityMetrics {
    /// Coefficient of variation (%) over the window
    pub variability: Percent,
    /// max(0, 100 - variability)
    pub consistency: f64,
    pub trend: TrendDirection,
    pub mean: f64,
    pub std_dev: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the first and last points of `series` in chronological order.
pub fn simple_trend(series: &[SeriesPoint], config: &AnalyticsConfig) -> SimpleTrend {
    if series.len() < 2 {
        return flat_trend(TrendStatus::InsufficientData);
    }
    let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
    sorted.sort_by_key(|p| (p.year, p.month.unwrap_or(0)));
    let values: Vec<f64> = sorted.iter().map(|p| p.value).collect();
    value_trend(&values, config)
}

/// Least-squares fit of the values against their index.
///
/// Fewer than two values give a flat line with zero fit.
pub fn linear_trend(values: &[f64]) -> LinearTrend {
    if values.len() < 2 {
        return LinearTrend {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
            r_squared: 0.0,
            direction: TrendDirection::Stable,
            confidence: FitConfidence::Low,
        };
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = guard((n * sum_xy - sum_x * sum_y) / denominator);
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();
    let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 {
        guard(1.0 - ss_res / ss_tot)
    } else {
        0.0
    };

    let direction = if slope.abs() < FLAT_SLOPE {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    let confidence = if r_squared > 0.8 {
        FitConfidence::High
    } else if r_squared > 0.5 {
        FitConfidence::Medium
    } else {
        FitConfidence::Low
    };

    LinearTrend {
        slope,
        intercept,
        r_squared,
        direction,
        confidence,
    }
}

/// Coefficient of variation and direction over the last `window` values.
pub fn variability_metrics(
    values: &[f64],
    window: usize,
    config: &AnalyticsConfig,
) -> VariabilityMetrics {
    if values.len() < 2 {
        return VariabilityMetrics {
            variability: 0.0,
            consistency: 100.0,
            trend: TrendDirection::Stable,
            mean: values.first().copied().unwrap_or(0.0),
            std_dev: 0.0,
        };
    }
    let recent = &values[values.len().saturating_sub(window.max(2))..];
    let avg = mean(recent);
    let std_dev = population_std_dev(recent);
    let variability = ratio(std_dev, avg) * 100.0;

    VariabilityMetrics {
        variability,
        consistency: (100.0 - variability).max(0.0),
        trend: value_trend(recent, config).direction,
        mean: avg,
        std_dev,
    }
}

/// First-to-last trend over values already in chronological order.
pub fn value_trend(values: &[f64], config: &AnalyticsConfig) -> SimpleTrend {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return flat_trend(TrendStatus::InsufficientData);
    };
    if first == 0.0 {
        return flat_trend(TrendStatus::NoBaseline);
    }
    let change = guard((last - first) / first * 100.0);

    let (direction, status) = if change.abs() < config.stable_band_pct {
        (TrendDirection::Stable, TrendStatus::Stable)
    } else if change > 0.0 {
        let status = if change > config.rapid_change_pct {
            TrendStatus::RapidlyIncreasing
        } else {
            TrendStatus::Increasing
        };
        (TrendDirection::Increasing, status)
    } else {
        let status = if change < -config.rapid_change_pct {
            TrendStatus::RapidlyDecreasing
        } else {
            TrendStatus::Decreasing
        };
        (TrendDirection::Decreasing, status)
    };

    SimpleTrend {
        direction,
        status,
        percentage: change.abs().round(),
        raw_percentage: change,
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn flat_trend(status: TrendStatus) -> SimpleTrend {
    SimpleTrend {
        direction: TrendDirection::Stable,
        status,
        percentage: 0.0,
        raw_percentage: 0.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint::new(2024, Some(i as u32 + 1), v))
            .collect()
    }

    #[test]
    fn test_simple_trend_bands() {
        let config = AnalyticsConfig::default();
        let t = simple_trend(&sample_series(&[100.0, 103.0]), &config);
        assert_eq!(t.status, TrendStatus::Stable);
        let t = simple_trend(&sample_series(&[100.0, 110.0]), &config);
        assert_eq!(t.status, TrendStatus::Increasing);
        assert_eq!(t.percentage, 10.0);
        let t = simple_trend(&sample_series(&[100.0, 130.0]), &config);
        assert_eq!(t.status, TrendStatus::RapidlyIncreasing);
        let t = simple_trend(&sample_series(&[100.0, 85.0]), &config);
        assert_eq!(t.status, TrendStatus::Decreasing);
        assert_eq!(t.direction, TrendDirection::Decreasing);
        let t = simple_trend(&sample_series(&[100.0, 50.0]), &config);
        assert_eq!(t.status, TrendStatus::RapidlyDecreasing);
    }

    #[test]
    fn test_simple_trend_sorts_chronologically() {
        let config = AnalyticsConfig::default();
        let mut series = sample_series(&[100.0, 150.0]);
        series.reverse();
        let t = simple_trend(&series, &config);
        assert_eq!(t.direction, TrendDirection::Increasing);
    }

    #[test]
    fn test_simple_trend_degenerate() {
        let config = AnalyticsConfig::default();
        assert_eq!(
            simple_trend(&sample_series(&[5.0]), &config).status,
            TrendStatus::InsufficientData
        );
        assert_eq!(
            simple_trend(&sample_series(&[0.0, 5.0]), &config).status,
            TrendStatus::NoBaseline
        );
    }

    #[test]
    fn test_linear_trend_perfect_fit() {
        let t = linear_trend(&[1.0, 3.0, 5.0, 7.0]);
        assert!((t.slope - 2.0).abs() < 1e-12);
        assert!((t.intercept - 1.0).abs() < 1e-12);
        assert!((t.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(t.direction, TrendDirection::Increasing);
        assert_eq!(t.confidence, FitConfidence::High);
        assert!((t.value_at(4.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_trend_flat_and_degenerate() {
        let t = linear_trend(&[5.0, 5.0, 5.0]);
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.r_squared, 0.0);
        let t = linear_trend(&[7.0]);
        assert_eq!(t.slope, 0.0);
        assert_eq!(t.confidence, FitConfidence::Low);
    }

    #[test]
    fn test_variability_metrics_window() {
        let config = AnalyticsConfig::default();
        // only the last two values are inside the window
        let m = variability_metrics(&[1000.0, 10.0, 10.0], 2, &config);
        assert_eq!(m.variability, 0.0);
        assert_eq!(m.consistency, 100.0);
        assert_eq!(m.mean, 10.0);
    }

    #[test]
    fn test_variability_metrics_cv() {
        let config = AnalyticsConfig::default();
        let m = variability_metrics(&[2.0, 4.0, 6.0, 8.0], 12, &config);
        let expected_cv = 5.0_f64.sqrt() / 5.0 * 100.0;
        assert!((m.variability - expected_cv).abs() < 1e-9);
        assert!((m.consistency - (100.0 - expected_cv)).abs() < 1e-9);
        assert_eq!(m.trend, TrendDirection::Increasing);
    }
}
