//! Individual forecasting methods.
//!
//! Each method returns `None` when it cannot run on the given history
//! instead of failing, so the ensemble can simply skip it. Every value a
//! method emits is finite and floored at `0`.

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::seasonal::patterns::seasonal_profile;
use crate::stats::{guard, mean};
use crate::trend::direction::linear_trend;
use crate::trend::smoothing::exponential_moving_average_values;
use crate::types::SeriesPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Linear,
    Exponential,
    SeasonalNaive,
    MovingAverage,
}

/// Values projected by one method, one per future period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodForecast {
    pub method: ForecastMethod,
    pub values: Vec<f64>,
}

/// Extend the least-squares line over `(index, value)`.
pub fn linear_forecast(values: &[f64], periods: usize) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }
    let fit = linear_trend(values);
    let n = values.len();
    Some(
        (0..periods)
            .map(|i| floor_at_zero(fit.value_at((n + i) as f64)))
            .collect(),
    )
}

/// Hold the final exponential moving average flat.
pub fn exponential_forecast(values: &[f64], periods: usize, alpha: f64) -> Option<Vec<f64>> {
    let last = *exponential_moving_average_values(values, alpha).last()?;
    Some(vec![floor_at_zero(last); periods])
}

/// Hold the mean of the last `window` values flat.
pub fn moving_average_forecast(values: &[f64], periods: usize, window: usize) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let recent = &values[values.len().saturating_sub(window.max(1))..];
    Some(vec![floor_at_zero(mean(recent)); periods])
}

/// Scale the last value by the seasonal index of each target month.
///
/// Needs `config.seasonal_naive_min_periods` points and a monthly last
/// point to know which months are being projected.
pub fn seasonal_naive_forecast(
    series: &[SeriesPoint],
    periods: usize,
    config: &AnalyticsConfig,
) -> Option<Vec<f64>> {
    if series.len() < config.seasonal_naive_min_periods {
        tracing::debug!(
            points = series.len(),
            required = config.seasonal_naive_min_periods,
            "seasonal-naive forecast skipped: not enough periods"
        );
        return None;
    }
    let last = series.last()?;
    let last_month = match last.month {
        Some(m) if (1..=12).contains(&m) => m,
        Some(m) => {
            tracing::debug!(month = m, "seasonal-naive forecast skipped: last month outside 1-12");
            return None;
        }
        None => {
            tracing::debug!("seasonal-naive forecast skipped: series is not monthly");
            return None;
        }
    };

    let profile = seasonal_profile(series, config);
    Some(
        (0..periods)
            .map(|offset| {
                floor_at_zero(last.value * profile.index_for(month_after(last_month, offset)) / 100.0)
            })
            .collect(),
    )
}

/// Calendar month `offset + 1` months after `month`.
fn month_after(month: u32, offset: usize) -> u32 {
    let next = i64::from(month) + offset as i64;
    (next.rem_euclid(12) + 1) as u32
}

fn floor_at_zero(value: f64) -> f64 {
    guard(value).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint::new(2023 + (i / 12) as i32, Some((i % 12) as u32 + 1), v))
            .collect()
    }

    #[test]
    fn test_linear_forecast_extends_line() {
        let f = linear_forecast(&[10.0, 20.0, 30.0], 2).unwrap();
        assert!((f[0] - 40.0).abs() < 1e-9);
        assert!((f[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_forecast_floors_at_zero() {
        let f = linear_forecast(&[30.0, 20.0, 10.0], 3).unwrap();
        assert_eq!(f[2], 0.0);
        assert!(linear_forecast(&[1.0], 3).is_none());
    }

    #[test]
    fn test_exponential_forecast_flat() {
        let f = exponential_forecast(&[10.0, 20.0], 3, 0.5).unwrap();
        assert_eq!(f, vec![15.0, 15.0, 15.0]);
        assert!(exponential_forecast(&[], 3, 0.5).is_none());
    }

    #[test]
    fn test_moving_average_forecast_last_window() {
        let f = moving_average_forecast(&[100.0, 1.0, 2.0, 3.0], 2, 3).unwrap();
        assert_eq!(f, vec![2.0, 2.0]);
        let f = moving_average_forecast(&[4.0], 1, 3).unwrap();
        assert_eq!(f, vec![4.0]);
    }

    #[test]
    fn test_seasonal_naive_needs_history() {
        let config = AnalyticsConfig::default();
        assert!(seasonal_naive_forecast(&sample_series(&[1.0; 11]), 3, &config).is_none());
    }

    #[test]
    fn test_seasonal_naive_uses_month_index() {
        let config = AnalyticsConfig::default();
        let mut values = [100.0; 12];
        values[0] = 200.0;
        // last point is December, next month is January
        let f = seasonal_naive_forecast(&sample_series(&values), 2, &config).unwrap();
        let overall = 1300.0 / 12.0;
        assert!((f[0] - 100.0 * (200.0 / overall)).abs() < 1e-9);
        assert!((f[1] - 100.0 * (100.0 / overall)).abs() < 1e-9);
    }

    #[test]
    fn test_month_after_wraps_year() {
        assert_eq!(month_after(12, 0), 1);
        assert_eq!(month_after(11, 0), 12);
        assert_eq!(month_after(1, 13), 3);
    }

    #[test]
    fn test_seasonal_naive_skips_invalid_last_month() {
        let config = AnalyticsConfig::default();
        let mut series = sample_series(&[100.0; 12]);
        series.push(SeriesPoint::new(2024, Some(0), 100.0));
        assert!(seasonal_naive_forecast(&series, 3, &config).is_none());
        series.last_mut().unwrap().month = Some(13);
        assert!(seasonal_naive_forecast(&series, 3, &config).is_none());
    }

    #[test]
    fn test_seasonal_naive_yearly_series_skipped() {
        let config = AnalyticsConfig::default();
        let series: Vec<SeriesPoint> = (0..12)
            .map(|i| SeriesPoint::new(2000 + i, None, 10.0))
            .collect();
        assert!(seasonal_naive_forecast(&series, 2, &config).is_none());
    }
}
