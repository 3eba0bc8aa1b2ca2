use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use esg_analytics_core::benchmark::position::{
    benchmark_position, industry_position, peer_statistics, IndustryBenchmark,
};
use esg_analytics_core::benchmark::targets::{evaluate_target, target_feasibility, Target};
use esg_analytics_core::config::AnalyticsConfig;

use crate::input;

/// Arguments for benchmark positioning
#[derive(Args)]
pub struct BenchmarkArgs {
    /// Path to JSON/YAML input file with `value` and any of `benchmarks`,
    /// `industry`, `peers`
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for target evaluation
#[derive(Args)]
pub struct TargetArgs {
    /// Path to JSON/YAML input file with `target`, `current_value`,
    /// `as_of_year` and optional `historical` values
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkRequest {
    value: f64,
    #[serde(default)]
    benchmarks: Vec<f64>,
    #[serde(default)]
    industry: Option<IndustryBenchmark>,
    #[serde(default)]
    peers: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct TargetRequest {
    target: Target,
    current_value: f64,
    as_of_year: i32,
    #[serde(default)]
    historical: Vec<f64>,
}

pub fn run_benchmark(args: BenchmarkArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BenchmarkRequest = input::read_input(args.input.as_deref(), "benchmarking")?;
    let industry = request
        .industry
        .as_ref()
        .map(|b| industry_position(request.value, b));
    let peers = (!request.peers.is_empty()).then(|| peer_statistics(request.value, &request.peers));

    Ok(serde_json::json!({
        "result": {
            "position": benchmark_position(request.value, &request.benchmarks),
            "industry": industry,
            "peers": peers,
        }
    }))
}

pub fn run_target(
    args: TargetArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: TargetRequest = input::read_input(args.input.as_deref(), "target evaluation")?;
    Ok(serde_json::json!({
        "result": {
            "evaluation": evaluate_target(&request.target, request.current_value, request.as_of_year),
            "feasibility": target_feasibility(&request.target, &request.historical, config),
        }
    }))
}
