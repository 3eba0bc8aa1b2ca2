use clap::{Args, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use esg_analytics_core::aggregation::breakdown::resource_breakdown;
use esg_analytics_core::aggregation::period::{
    aggregate_by_period, summarize_buckets, AggregationFn, Granularity,
};
use esg_analytics_core::conversion::units::{
    emission_observations, total_emissions, Dimension, EmissionRecord,
};

use super::SeriesRequest;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GranularityArg {
    Monthly,
    Quarterly,
    Yearly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Monthly => Granularity::Monthly,
            GranularityArg::Quarterly => Granularity::Quarterly,
            GranularityArg::Yearly => Granularity::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FunctionArg {
    Sum,
    Average,
    Max,
    Min,
}

impl From<FunctionArg> for AggregationFn {
    fn from(arg: FunctionArg) -> Self {
        match arg {
            FunctionArg::Sum => AggregationFn::Sum,
            FunctionArg::Average => AggregationFn::Average,
            FunctionArg::Max => AggregationFn::Max,
            FunctionArg::Min => AggregationFn::Min,
        }
    }
}

/// Arguments for period aggregation
#[derive(Args)]
pub struct AggregateArgs {
    /// Path to JSON/YAML input file with `observations`
    #[arg(long)]
    pub input: Option<String>,
    #[arg(long, value_enum, default_value = "monthly")]
    pub granularity: GranularityArg,
    /// Reduction applied to each bucket
    #[arg(long, value_enum, default_value = "sum")]
    pub function: FunctionArg,
    /// Keep a separate bucket per observation dimension
    #[arg(long)]
    pub by_dimension: bool,
}

/// Arguments for emissions quantification from consumption records
#[derive(Args)]
pub struct EmissionsArgs {
    /// Path to JSON/YAML input file with `records`
    #[arg(long)]
    pub input: Option<String>,
    #[arg(long, value_enum, default_value = "monthly")]
    pub granularity: GranularityArg,
    /// Number of top contributing resources to report
    #[arg(long, default_value_t = 5)]
    pub top_n: usize,
}

#[derive(Debug, Deserialize)]
struct EmissionsRequest {
    records: Vec<EmissionRecord>,
    /// Split the period series along this field
    #[serde(default)]
    dimension: Option<Dimension>,
}

pub fn run_aggregate(args: AggregateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SeriesRequest = input::read_input(args.input.as_deref(), "aggregation")?;
    let buckets = aggregate_by_period(
        &request.observations,
        args.granularity.into(),
        args.by_dimension,
    )?;
    let summaries = summarize_buckets(&buckets, args.function.into());
    Ok(serde_json::json!({ "result": summaries }))
}

pub fn run_emissions(args: EmissionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: EmissionsRequest = input::read_input(args.input.as_deref(), "emissions")?;
    let observations = emission_observations(&request.records, request.dimension);
    let buckets = aggregate_by_period(
        &observations,
        args.granularity.into(),
        request.dimension.is_some(),
    )?;

    Ok(serde_json::json!({
        "result": {
            "totals": total_emissions(&request.records),
            "periods": summarize_buckets(&buckets, AggregationFn::Sum),
            "breakdown": resource_breakdown(&request.records, args.top_n),
        }
    }))
}
