use clap::Args;
use serde_json::Value;

use esg_analytics_core::conversion::cement::{calculate_cement_emissions, CementEmissionsInput};

use crate::input;

/// Arguments for clinker calcination emissions
#[derive(Args)]
pub struct CementArgs {
    /// Path to JSON/YAML input file with clinker, raw-material and
    /// silicate `entries`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cement(args: CementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CementEmissionsInput =
        input::read_input(args.input.as_deref(), "cement calcination")?;
    let result = calculate_cement_emissions(&request)?;
    Ok(serde_json::to_value(result)?)
}
