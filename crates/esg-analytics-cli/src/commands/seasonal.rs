use clap::Args;
use serde_json::Value;

use esg_analytics_core::config::AnalyticsConfig;
use esg_analytics_core::seasonal::decomposition::seasonal_decomposition;
use esg_analytics_core::seasonal::patterns::seasonal_profile;

use super::SeriesRequest;
use crate::input;

/// Arguments for seasonal decomposition and profile
#[derive(Args)]
pub struct SeasonalArgs {
    /// Path to JSON/YAML input file with `observations`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_seasonal(
    args: SeasonalArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SeriesRequest = input::read_input(args.input.as_deref(), "seasonal analysis")?;
    let series = request.series()?;
    Ok(serde_json::json!({
        "result": {
            "decomposition": seasonal_decomposition(&series, config),
            "profile": seasonal_profile(&series, config),
        }
    }))
}
