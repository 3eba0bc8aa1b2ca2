use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use esg_analytics_core::aggregation::breakdown::resource_breakdown;
use esg_analytics_core::aggregation::period::{
    aggregate_by_period, summarize_buckets, AggregationFn, Granularity,
};
use esg_analytics_core::benchmark::position::{
    benchmark_position, industry_position, peer_statistics, IndustryBenchmark,
};
use esg_analytics_core::benchmark::targets::{evaluate_target, target_feasibility, Target};
use esg_analytics_core::conversion::units::{emission_observations, total_emissions, Dimension, EmissionRecord};
use esg_analytics_core::intensity::metrics::{
    facility_efficiency, intensity_metrics, EfficiencyBenchmarks, FacilityMetrics,
};
use esg_analytics_core::forecast::ensemble::MAX_FORECAST_PERIODS;
use esg_analytics_core::quality::integrity::checked_series;
use esg_analytics_core::{AnalyticsConfig, Observation, SeriesPoint};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: for<'de> Deserialize<'de>>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: serde::Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

/// Single-series payload; `config` falls back to the defaults.
#[derive(Deserialize)]
struct SeriesRequest {
    observations: Vec<Observation>,
    #[serde(default)]
    config: Option<AnalyticsConfig>,
}

impl SeriesRequest {
    fn config(&self) -> NapiResult<AnalyticsConfig> {
        let config = self.config.clone().unwrap_or_default();
        config.validate().map_err(to_napi_error)?;
        Ok(config)
    }

    fn series(&self) -> NapiResult<Vec<SeriesPoint>> {
        checked_series(&self.observations).map_err(to_napi_error)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AggregateRequest {
    observations: Vec<Observation>,
    #[serde(default = "default_granularity")]
    granularity: Granularity,
    #[serde(default)]
    function: AggregationFn,
    #[serde(default)]
    by_dimension: bool,
}

fn default_granularity() -> Granularity {
    Granularity::Monthly
}

#[napi]
pub fn aggregate_observations(input_json: String) -> NapiResult<String> {
    let input: AggregateRequest = parse(&input_json)?;
    let buckets = aggregate_by_period(&input.observations, input.granularity, input.by_dimension)
        .map_err(to_napi_error)?;
    render(&summarize_buckets(&buckets, input.function))
}

#[derive(Deserialize)]
struct EmissionsRequest {
    records: Vec<EmissionRecord>,
    #[serde(default)]
    dimension: Option<Dimension>,
    #[serde(default = "default_granularity")]
    granularity: Granularity,
    #[serde(default = "default_top_n")]
    top_n: usize,
}

fn default_top_n() -> usize {
    5
}

#[napi]
pub fn quantify_emissions(input_json: String) -> NapiResult<String> {
    let input: EmissionsRequest = parse(&input_json)?;
    let observations = emission_observations(&input.records, input.dimension);
    let buckets = aggregate_by_period(&observations, input.granularity, input.dimension.is_some())
        .map_err(to_napi_error)?;
    render(&serde_json::json!({
        "totals": total_emissions(&input.records),
        "periods": summarize_buckets(&buckets, AggregationFn::Sum),
        "breakdown": resource_breakdown(&input.records, input.top_n),
    }))
}

#[napi]
pub fn cement_emissions(input_json: String) -> NapiResult<String> {
    let input: esg_analytics_core::conversion::cement::CementEmissionsInput = parse(&input_json)?;
    let output = esg_analytics_core::conversion::cement::calculate_cement_emissions(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Intensity
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IntensityRequest {
    emissions: Vec<Observation>,
    production: Vec<Observation>,
    #[serde(default)]
    energy: Vec<Observation>,
}

#[napi]
pub fn intensity_series(input_json: String) -> NapiResult<String> {
    let input: IntensityRequest = parse(&input_json)?;
    render(&intensity_metrics(&input.emissions, &input.production, &input.energy))
}

#[derive(Deserialize)]
struct EfficiencyRequest {
    facilities: Vec<FacilityMetrics>,
    #[serde(default)]
    benchmarks: EfficiencyBenchmarks,
}

#[napi]
pub fn score_facility_efficiency(input_json: String) -> NapiResult<String> {
    let input: EfficiencyRequest = parse(&input_json)?;
    render(&facility_efficiency(&input.facilities, &input.benchmarks))
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[napi]
pub fn trend_analysis(input_json: String) -> NapiResult<String> {
    use esg_analytics_core::trend::direction::{linear_trend, simple_trend};
    use esg_analytics_core::trend::growth::yoy_growth;
    use esg_analytics_core::trend::smoothing::{
        detect_trend_changes, exponential_moving_average, moving_average,
    };

    let input: SeriesRequest = parse(&input_json)?;
    let config = input.config()?;
    let series = input.series()?;
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let smoothed = exponential_moving_average(
        &moving_average(&series, config.moving_average_window),
        config.ema_alpha,
    );
    render(&serde_json::json!({
        "simple_trend": simple_trend(&series, &config),
        "linear_trend": linear_trend(&values),
        "trend_changes": detect_trend_changes(&series, config.trend_sensitivity),
        "yoy": yoy_growth(&series),
        "series": smoothed,
    }))
}

#[napi]
pub fn seasonal_analysis(input_json: String) -> NapiResult<String> {
    use esg_analytics_core::seasonal::decomposition::seasonal_decomposition;
    use esg_analytics_core::seasonal::patterns::seasonal_profile;

    let input: SeriesRequest = parse(&input_json)?;
    let config = input.config()?;
    let series = input.series()?;
    render(&serde_json::json!({
        "decomposition": seasonal_decomposition(&series, &config),
        "profile": seasonal_profile(&series, &config),
    }))
}

#[derive(Deserialize)]
struct CorrelateRequest {
    left: Vec<Observation>,
    right: Vec<Observation>,
}

#[napi]
pub fn correlate_series(input_json: String) -> NapiResult<String> {
    use esg_analytics_core::correlation::pearson::correlate_by_period;

    let input: CorrelateRequest = parse(&input_json)?;
    let left = checked_series(&input.left).map_err(to_napi_error)?;
    let right = checked_series(&input.right).map_err(to_napi_error)?;
    let output = correlate_by_period(&left, &right).map_err(to_napi_error)?;
    render(&output)
}

#[derive(Deserialize)]
struct ForecastRequest {
    #[serde(flatten)]
    series: SeriesRequest,
    #[serde(default = "default_forecast_periods")]
    periods: usize,
}

fn default_forecast_periods() -> usize {
    12
}

#[napi]
pub fn forecast_series(input_json: String) -> NapiResult<String> {
    use esg_analytics_core::forecast::ensemble::ensemble_forecast;

    let input: ForecastRequest = parse(&input_json)?;
    if input.periods > MAX_FORECAST_PERIODS {
        return Err(to_napi_error(format!(
            "periods must be at most {MAX_FORECAST_PERIODS}"
        )));
    }
    let config = input.series.config()?;
    render(&ensemble_forecast(&input.series.series()?, input.periods, &config))
}

#[napi]
pub fn analyze_time_series(input_json: String) -> NapiResult<String> {
    let input: esg_analytics_core::analysis::TimeSeriesInput = parse(&input_json)?;
    let output = esg_analytics_core::analysis::analyze_time_series(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Benchmarks and targets
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BenchmarkRequest {
    value: f64,
    #[serde(default)]
    benchmarks: Vec<f64>,
    #[serde(default)]
    industry: Option<IndustryBenchmark>,
    #[serde(default)]
    peers: Vec<f64>,
}

#[napi]
pub fn benchmark_value(input_json: String) -> NapiResult<String> {
    let input: BenchmarkRequest = parse(&input_json)?;
    let industry = input.industry.as_ref().map(|b| industry_position(input.value, b));
    let peers = (!input.peers.is_empty()).then(|| peer_statistics(input.value, &input.peers));
    render(&serde_json::json!({
        "position": benchmark_position(input.value, &input.benchmarks),
        "industry": industry,
        "peers": peers,
    }))
}

#[derive(Deserialize)]
struct TargetRequest {
    target: Target,
    current_value: f64,
    as_of_year: i32,
    #[serde(default)]
    historical: Vec<f64>,
    #[serde(default)]
    config: Option<AnalyticsConfig>,
}

#[napi]
pub fn evaluate_reduction_target(input_json: String) -> NapiResult<String> {
    let input: TargetRequest = parse(&input_json)?;
    let config = input.config.clone().unwrap_or_default();
    config.validate().map_err(to_napi_error)?;
    render(&serde_json::json!({
        "evaluation": evaluate_target(&input.target, input.current_value, input.as_of_year),
        "feasibility": target_feasibility(&input.target, &input.historical, &config),
    }))
}

// ---------------------------------------------------------------------------
// Data quality
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_data_quality(input_json: String) -> NapiResult<String> {
    let input: esg_analytics_core::quality::DataQualityInput = parse(&input_json)?;
    let output = esg_analytics_core::quality::assess_data_quality(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn check_consistency(input_json: String) -> NapiResult<String> {
    let input: esg_analytics_core::quality::consistency::ConsistencyInput = parse(&input_json)?;
    render(&esg_analytics_core::quality::consistency::check_consistency(&input))
}

#[napi]
pub fn check_data_ranges(input_json: String) -> NapiResult<String> {
    let input: esg_analytics_core::quality::ranges::RangeCheckInput = parse(&input_json)?;
    render(&esg_analytics_core::quality::ranges::check_data_ranges(&input))
}
