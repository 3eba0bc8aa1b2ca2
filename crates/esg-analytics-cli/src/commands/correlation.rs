use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use esg_analytics_core::correlation::pearson::correlate_by_period;
use esg_analytics_core::quality::integrity::checked_series;
use esg_analytics_core::Observation;

use crate::input;

/// Arguments for period-aligned Pearson correlation
#[derive(Args)]
pub struct CorrelateArgs {
    /// Path to JSON/YAML input file with `left` and `right` observations
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CorrelateRequest {
    left: Vec<Observation>,
    right: Vec<Observation>,
}

pub fn run_correlate(args: CorrelateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CorrelateRequest = input::read_input(args.input.as_deref(), "correlation")?;
    let result = correlate_by_period(&checked_series(&request.left)?, &checked_series(&request.right)?)?;
    Ok(serde_json::json!({ "result": result }))
}
