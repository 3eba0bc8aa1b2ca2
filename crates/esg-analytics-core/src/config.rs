//! Tunable thresholds for the analytics engines.
//!
//! `AnalyticsConfig::default()` gives the stock thresholds. Any field left
//! out of a config document takes its default.

use serde::{Deserialize, Serialize};

use crate::error::EsgAnalyticsError;
use crate::EsgAnalyticsResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Smoothing constant for exponential moving averages and the
    /// exponential-smoothing forecast.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Window for the reported moving-average series.
    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: usize,
    /// Minimum relative change (0.1 = 10%) for a direction flip to count
    /// as a trend reversal.
    #[serde(default = "default_trend_sensitivity")]
    pub trend_sensitivity: f64,
    /// Variance of decomposition seasonal indices around 1.0 above which a
    /// series is called seasonal.
    #[serde(default = "default_seasonal_significance")]
    pub seasonal_significance: f64,
    /// Variance of month-average indices (scaled by 100) above which the
    /// seasonal profile reports a pattern.
    #[serde(default = "default_seasonal_pattern_variance")]
    pub seasonal_pattern_variance: f64,
    #[serde(default = "default_decomposition_min_periods")]
    pub decomposition_min_periods: usize,
    #[serde(default = "default_seasonal_naive_min_periods")]
    pub seasonal_naive_min_periods: usize,
    #[serde(default = "default_forecast_min_periods")]
    pub forecast_min_periods: usize,
    #[serde(default = "default_forecast_ma_window")]
    pub forecast_ma_window: usize,
    #[serde(default = "default_outlier_z_threshold")]
    pub outlier_z_threshold: f64,
    #[serde(default = "default_anomaly_high_z")]
    pub anomaly_high_z: f64,
    #[serde(default = "default_anomaly_min_points")]
    pub anomaly_min_points: usize,
    /// First-to-last change (%) inside which a simple trend is "stable".
    #[serde(default = "default_stable_band_pct")]
    pub stable_band_pct: f64,
    /// First-to-last change (%) beyond which a simple trend is "rapid".
    #[serde(default = "default_rapid_change_pct")]
    pub rapid_change_pct: f64,
    /// Largest tolerated distance between consecutive monthly periods.
    #[serde(default = "default_max_gap_months")]
    pub max_gap_months: u32,
}

fn default_ema_alpha() -> f64 {
    0.3
}
fn default_moving_average_window() -> usize {
    3
}
fn default_trend_sensitivity() -> f64 {
    0.1
}
fn default_seasonal_significance() -> f64 {
    0.01
}
fn default_seasonal_pattern_variance() -> f64 {
    100.0
}
fn default_decomposition_min_periods() -> usize {
    24
}
fn default_seasonal_naive_min_periods() -> usize {
    12
}
fn default_forecast_min_periods() -> usize {
    6
}
fn default_forecast_ma_window() -> usize {
    3
}
fn default_outlier_z_threshold() -> f64 {
    2.0
}
fn default_anomaly_high_z() -> f64 {
    3.0
}
fn default_anomaly_min_points() -> usize {
    6
}
fn default_stable_band_pct() -> f64 {
    5.0
}
fn default_rapid_change_pct() -> f64 {
    20.0
}
fn default_max_gap_months() -> u32 {
    3
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            ema_alpha: default_ema_alpha(),
            moving_average_window: default_moving_average_window(),
            trend_sensitivity: default_trend_sensitivity(),
            seasonal_significance: default_seasonal_significance(),
            seasonal_pattern_variance: default_seasonal_pattern_variance(),
            decomposition_min_periods: default_decomposition_min_periods(),
            seasonal_naive_min_periods: default_seasonal_naive_min_periods(),
            forecast_min_periods: default_forecast_min_periods(),
            forecast_ma_window: default_forecast_ma_window(),
            outlier_z_threshold: default_outlier_z_threshold(),
            anomaly_high_z: default_anomaly_high_z(),
            anomaly_min_points: default_anomaly_min_points(),
            stable_band_pct: default_stable_band_pct(),
            rapid_change_pct: default_rapid_change_pct(),
            max_gap_months: default_max_gap_months(),
        }
    }
}

impl AnalyticsConfig {
    /// Reject parameter combinations the engines cannot honour.
    pub fn validate(&self) -> EsgAnalyticsResult<()> {
        if !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(EsgAnalyticsError::InvalidInput {
                field: "ema_alpha".into(),
                reason: "Smoothing constant must be between 0 and 1.".into(),
            });
        }
        if self.moving_average_window == 0 || self.forecast_ma_window == 0 {
            return Err(EsgAnalyticsError::InvalidInput {
                field: "moving_average_window".into(),
                reason: "Moving-average windows must be at least 1.".into(),
            });
        }
        if self.trend_sensitivity < 0.0 {
            return Err(EsgAnalyticsError::InvalidInput {
                field: "trend_sensitivity".into(),
                reason: "Sensitivity cannot be negative.".into(),
            });
        }
        if self.outlier_z_threshold <= 0.0 || self.anomaly_high_z <= 0.0 {
            return Err(EsgAnalyticsError::InvalidInput {
                field: "outlier_z_threshold".into(),
                reason: "Z-score thresholds must be positive.".into(),
            });
        }
        if self.decomposition_min_periods < 13 {
            return Err(EsgAnalyticsError::InvalidInput {
                field: "decomposition_min_periods".into(),
                reason: "Decomposition needs more than one 12-period window.".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_thresholds() {
        let cfg = AnalyticsConfig::default();
        assert_eq!(cfg.trend_sensitivity, 0.1);
        assert_eq!(cfg.seasonal_significance, 0.01);
        assert_eq!(cfg.outlier_z_threshold, 2.0);
        assert_eq!(cfg.decomposition_min_periods, 24);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: AnalyticsConfig = serde_json::from_str(r#"{"ema_alpha": 0.5}"#).unwrap();
        assert_eq!(cfg.ema_alpha, 0.5);
        assert_eq!(cfg.moving_average_window, 3);
        assert_eq!(cfg.max_gap_months, 3);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let cfg = AnalyticsConfig {
            ema_alpha: 1.5,
            ..AnalyticsConfig::default()
        };
        match cfg.validate().unwrap_err() {
            EsgAnalyticsError::InvalidInput { field, .. } => assert_eq!(field, "ema_alpha"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
