use clap::Args;
use serde_json::Value;

use esg_analytics_core::config::AnalyticsConfig;
use esg_analytics_core::quality::consistency::{check_consistency, ConsistencyInput};
use esg_analytics_core::quality::ranges::{check_data_ranges, RangeCheckInput};
use esg_analytics_core::quality::{assess_data_quality, DataQualityInput};

use crate::input;

/// Arguments for the data quality assessment
#[derive(Args)]
pub struct QualityArgs {
    /// Path to JSON/YAML input file with `observations`, optional
    /// `granularity`, `expected_count` and `config`
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cross-record consistency checks
#[derive(Args)]
pub struct ConsistencyArgs {
    /// Path to JSON/YAML input file with `emissions`, `production` and
    /// `targets` records
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for data range plausibility checks
#[derive(Args)]
pub struct RangesArgs {
    /// Path to JSON/YAML input file with `carbon_intensity`,
    /// `capacity_utilization` and `carbon_intensity_range`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_quality(
    args: QualityArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: DataQualityInput =
        input::read_input(args.input.as_deref(), "data quality assessment")?;
    request.config.get_or_insert_with(|| config.clone());
    let result = assess_data_quality(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_consistency(args: ConsistencyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConsistencyInput = input::read_input(args.input.as_deref(), "consistency checks")?;
    Ok(serde_json::json!({ "result": check_consistency(&request) }))
}

pub fn run_ranges(args: RangesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RangeCheckInput = input::read_input(args.input.as_deref(), "range checks")?;
    Ok(serde_json::json!({ "result": check_data_ranges(&request) }))
}
