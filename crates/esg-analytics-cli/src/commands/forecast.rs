use clap::Args;
use serde_json::Value;

use esg_analytics_core::config::AnalyticsConfig;
use esg_analytics_core::forecast::ensemble::{ensemble_forecast, MAX_FORECAST_PERIODS};

use super::SeriesRequest;
use crate::input;

/// Arguments for the ensemble forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to JSON/YAML input file with `observations`
    #[arg(long)]
    pub input: Option<String>,
    /// Number of future periods
    #[arg(long, default_value_t = 12)]
    pub periods: usize,
}

pub fn run_forecast(
    args: ForecastArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    if args.periods > MAX_FORECAST_PERIODS {
        return Err(format!("--periods must be at most {MAX_FORECAST_PERIODS}").into());
    }
    let request: SeriesRequest = input::read_input(args.input.as_deref(), "forecast")?;
    let output = ensemble_forecast(&request.series()?, args.periods, config);
    Ok(serde_json::json!({ "result": output }))
}
