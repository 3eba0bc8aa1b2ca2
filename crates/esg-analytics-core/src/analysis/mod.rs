//! Composite time-series report.
//!
//! Runs every engine over one observation list and collects the results in
//! a single envelope. Steps that cannot run on the data (too few periods,
//! yearly data for monthly-only methods) degrade to empty results and leave
//! a warning; only malformed observations or parameters are errors.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::aggregation::period::{aggregate_by_period, buckets_to_series, AggregationFn, Granularity};
use crate::config::AnalyticsConfig;
use crate::error::EsgAnalyticsError;
use crate::forecast::ensemble::{
    ensemble_forecast, ForecastOutput, ForecastStatus, MAX_FORECAST_PERIODS,
};
use crate::quality::integrity::{check_period_fields, implied_granularity};
use crate::quality::outliers::{detect_anomalies, Anomaly};
use crate::seasonal::decomposition::{seasonal_decomposition, SeasonalDecomposition};
use crate::seasonal::patterns::{seasonal_profile, SeasonalProfile};
use crate::stats::{summarize, SummaryStatistics};
use crate::trend::direction::{
    linear_trend, simple_trend, variability_metrics, LinearTrend, SimpleTrend, VariabilityMetrics,
};
use crate::trend::growth::{qoq_growth, yoy_growth, QuarterGrowth};
use crate::trend::smoothing::{detect_trend_changes, exponential_moving_average, moving_average, TrendChange};
use crate::types::{with_metadata, ComputationOutput, Observation, Percent, SeriesPoint};
use crate::EsgAnalyticsResult;

const VARIABILITY_WINDOW: usize = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_forecast_periods() -> usize {
    12
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesInput {
    /// Raw observations; several observations for one period are summed
    pub observations: Vec<Observation>,
    /// Periods to forecast, 0 skips the forecast
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: usize,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    High,
    Medium,
    Low,
}

impl Reliability {
    /// Grade of a linear fit by its R².
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.7 {
            Reliability::High
        } else if r_squared > 0.4 {
            Reliability::Medium
        } else {
            Reliability::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    pub data_points: usize,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    pub statistics: SummaryStatistics,
    pub simple_trend: SimpleTrend,
    pub linear_trend: LinearTrend,
    /// Per-period series with moving average and EMA filled in
    pub series: Vec<SeriesPoint>,
    pub trend_changes: Vec<TrendChange>,
    pub yoy: Vec<SeriesPoint>,
    pub qoq: Vec<QuarterGrowth>,
    pub decomposition: SeasonalDecomposition,
    pub seasonal_profile: SeasonalProfile,
    pub forecast: ForecastOutput,
    pub anomalies: Vec<Anomaly>,
    pub variability: VariabilityMetrics,
    /// Coefficient of variation over the whole series
    pub volatility: Percent,
    pub reliability: Reliability,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_time_series(
    input: &TimeSeriesInput,
) -> EsgAnalyticsResult<ComputationOutput<TimeSeriesReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation ----------------------------------------------------------
    let config = input.config.clone().unwrap_or_default();
    config.validate()?;
    if input.forecast_periods > MAX_FORECAST_PERIODS {
        return Err(EsgAnalyticsError::InvalidInput {
            field: "forecast_periods".into(),
            reason: format!("At most {MAX_FORECAST_PERIODS} periods can be forecast."),
        });
    }

    let granularity = implied_granularity(&input.observations);
    let monthly = granularity == Granularity::Monthly;
    if let Some(defect) = check_period_fields(&input.observations, granularity)
        .into_iter()
        .next()
    {
        return Err(defect.into());
    }

    // -- Canonical series ----------------------------------------------------
    let buckets = aggregate_by_period(&input.observations, granularity, false)?;
    let series = buckets_to_series(&buckets, AggregationFn::Sum);
    if series.len() < input.observations.len() {
        warnings.push(format!(
            "{} observation(s) shared a period and were summed",
            input.observations.len() - series.len()
        ));
    }
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();

    // -- Statistics and trend ------------------------------------------------
    let statistics = summarize(&values);
    let simple = simple_trend(&series, &config);
    let linear = linear_trend(&values);
    if series.len() < 2 {
        warnings.push("Trend needs at least 2 periods".to_string());
    }

    let smoothed = exponential_moving_average(
        &moving_average(&series, config.moving_average_window),
        config.ema_alpha,
    );
    let trend_changes = detect_trend_changes(&series, config.trend_sensitivity);

    // -- Growth --------------------------------------------------------------
    let yoy = yoy_growth(&series);
    let qoq = if monthly {
        qoq_growth(&series)?
    } else {
        warnings.push("Quarter-over-quarter growth skipped: yearly data".to_string());
        Vec::new()
    };

    // -- Seasonality ---------------------------------------------------------
    let seasonal_input: &[SeriesPoint] = if monthly {
        &series
    } else {
        warnings.push("Seasonal analysis skipped: yearly data".to_string());
        &[]
    };
    let decomposition = seasonal_decomposition(seasonal_input, &config);
    if monthly && series.len() < config.decomposition_min_periods {
        warnings.push(format!(
            "Seasonal decomposition skipped: {} periods < {}",
            series.len(),
            config.decomposition_min_periods
        ));
    }
    let profile = seasonal_profile(seasonal_input, &config);
    if monthly && series.len() < config.seasonal_naive_min_periods {
        warnings.push(format!(
            "Seasonal profile skipped: {} periods < {}",
            series.len(),
            config.seasonal_naive_min_periods
        ));
    }

    // -- Forecast ------------------------------------------------------------
    let forecast = ensemble_forecast(&series, input.forecast_periods, &config);
    if forecast.status == ForecastStatus::InsufficientData {
        warnings.push(format!(
            "Forecast skipped: {} periods < {}",
            series.len(),
            config.forecast_min_periods
        ));
    } else if input.forecast_periods == 0 {
        warnings.push("Forecast horizon is 0".to_string());
    }

    // -- Anomalies and variability -------------------------------------------
    let anomalies = detect_anomalies(&series, &config);
    if series.len() < config.anomaly_min_points {
        warnings.push(format!(
            "Anomaly detection skipped: {} periods < {}",
            series.len(),
            config.anomaly_min_points
        ));
    }
    let variability = variability_metrics(&values, VARIABILITY_WINDOW, &config);
    if statistics.mean <= 0.0 && !values.is_empty() {
        warnings.push("Non-positive mean: volatility reported as 0".to_string());
    }

    let output = TimeSeriesReport {
        data_points: series.len(),
        start_period: series.first().map(|p| p.period.clone()),
        end_period: series.last().map(|p| p.period.clone()),
        volatility: statistics.coefficient_of_variation,
        reliability: Reliability::from_r_squared(linear.r_squared),
        statistics,
        simple_trend: simple,
        linear_trend: linear,
        series: smoothed,
        trend_changes,
        yoy,
        qoq,
        decomposition,
        seasonal_profile: profile,
        forecast,
        anomalies,
        variability,
    };

    tracing::debug!(
        points = output.data_points,
        warnings = warnings.len(),
        "time-series analysis complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "granularity": granularity,
        "forecast_periods": input.forecast_periods,
        "ema_alpha": config.ema_alpha,
        "moving_average_window": config.moving_average_window,
        "trend_sensitivity": config.trend_sensitivity,
        "seasonal_significance": config.seasonal_significance,
        "reliability_bands": { "high": "R2 > 0.7", "medium": "R2 > 0.4" }
    });

    Ok(with_metadata(
        "Time-series analysis (trend, seasonality, ensemble forecast, anomalies)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
