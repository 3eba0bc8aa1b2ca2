use clap::Args;
use serde_json::Value;

use esg_analytics_core::analysis::{analyze_time_series, TimeSeriesInput};
use esg_analytics_core::config::AnalyticsConfig;

use crate::input;

/// Arguments for the composite time-series report
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON/YAML input file with `observations`, optional
    /// `forecast_periods` and `config`
    #[arg(long)]
    pub input: Option<String>,
    /// Override the forecast horizon of the input document
    #[arg(long)]
    pub periods: Option<usize>,
}

pub fn run_analyze(
    args: AnalyzeArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: TimeSeriesInput =
        input::read_input(args.input.as_deref(), "time-series analysis")?;
    if let Some(periods) = args.periods {
        request.forecast_periods = periods;
    }
    request.config.get_or_insert_with(|| config.clone());
    let result = analyze_time_series(&request)?;
    Ok(serde_json::to_value(result)?)
}
