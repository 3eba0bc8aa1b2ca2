//! Ensemble forecast.
//!
//! Up to four methods project the series forward; each future period is the
//! plain mean of the methods that produced a value for it. `confidence` and
//! `variance` are heuristics (method count and spread across methods), not
//! statistical intervals.

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::forecast::methods::{
    exponential_forecast, linear_forecast, moving_average_forecast, seasonal_naive_forecast,
    ForecastMethod, MethodForecast,
};
use crate::stats::{mean, population_std_dev};
use crate::types::{period_key, SeriesPoint};

/// Longest horizon the request-level entry points accept.
pub const MAX_FORECAST_PERIODS: usize = 60;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastConfidence {
    Low,
    Medium,
    High,
}

impl ForecastConfidence {
    pub fn from_method_count(count: usize) -> Self {
        match count {
            0 | 1 => ForecastConfidence::Low,
            2 => ForecastConfidence::Medium,
            _ => ForecastConfidence::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Ok,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub value: f64,
    pub confidence: ForecastConfidence,
    /// Number of methods that contributed to this period
    pub methods: usize,
    /// Population standard deviation across the contributing methods
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub forecast: Vec<ForecastPoint>,
    pub individual: Vec<MethodForecast>,
    pub methods_used: usize,
    pub data_points: usize,
    pub seasonality_detected: bool,
    pub status: ForecastStatus,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Blend all available methods into a `periods`-step forecast.
///
/// The history is read in chronological order. With fewer than
/// `config.forecast_min_periods` points the forecast is empty and the status
/// says why; a method that cannot run only lowers the method count.
pub fn ensemble_forecast(
    series: &[SeriesPoint],
    periods: usize,
    config: &AnalyticsConfig,
) -> ForecastOutput {
    if series.len() < config.forecast_min_periods {
        tracing::debug!(
            points = series.len(),
            required = config.forecast_min_periods,
            "forecast skipped: not enough periods"
        );
        return ForecastOutput {
            forecast: Vec::new(),
            individual: Vec::new(),
            methods_used: 0,
            data_points: series.len(),
            seasonality_detected: false,
            status: ForecastStatus::InsufficientData,
        };
    }

    let mut history: Vec<SeriesPoint> = series.to_vec();
    history.sort_by_key(|p| (p.year, p.month.unwrap_or(0)));
    let values: Vec<f64> = history.iter().map(|p| p.value).collect();

    let candidates = [
        (ForecastMethod::Linear, linear_forecast(&values, periods)),
        (
            ForecastMethod::Exponential,
            exponential_forecast(&values, periods, config.ema_alpha),
        ),
        (
            ForecastMethod::SeasonalNaive,
            seasonal_naive_forecast(&history, periods, config),
        ),
        (
            ForecastMethod::MovingAverage,
            moving_average_forecast(&values, periods, config.forecast_ma_window),
        ),
    ];
    let individual: Vec<MethodForecast> = candidates
        .into_iter()
        .filter_map(|(method, values)| values.map(|values| MethodForecast { method, values }))
        .collect();

    let forecast = match history.last() {
        Some(last) => (0..periods)
            .map(|i| blend_period(last, i, &individual))
            .collect(),
        None => Vec::new(),
    };

    tracing::trace!(
        points = history.len(),
        periods,
        methods = individual.len(),
        "computed ensemble forecast"
    );

    ForecastOutput {
        forecast,
        methods_used: individual.len(),
        data_points: history.len(),
        seasonality_detected: individual
            .iter()
            .any(|m| m.method == ForecastMethod::SeasonalNaive),
        status: ForecastStatus::Ok,
        individual,
    }
}

/// Label of the `offset`-th (0-based) period after `last`.
pub fn future_period(last: &SeriesPoint, offset: usize) -> (i32, Option<u32>) {
    let step = offset as i64 + 1;
    match last.month {
        Some(month) => {
            let next = i64::from(month) + step;
            let year = i64::from(last.year) + (next - 1).div_euclid(12);
            let month = (next - 1).rem_euclid(12) + 1;
            (year as i32, Some(month as u32))
        }
        None => ((i64::from(last.year) + step) as i32, None),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn blend_period(last: &SeriesPoint, offset: usize, individual: &[MethodForecast]) -> ForecastPoint {
    let contributions: Vec<f64> = individual
        .iter()
        .filter_map(|m| m.values.get(offset).copied())
        .collect();
    let (year, month) = future_period(last, offset);

    ForecastPoint {
        period: period_key(year, month),
        year,
        month,
        value: mean(&contributions).max(0.0),
        confidence: ForecastConfidence::from_method_count(contributions.len()),
        methods: contributions.len(),
        variance: population_std_dev(&contributions),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
