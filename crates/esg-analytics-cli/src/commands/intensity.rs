use clap::{Args, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use esg_analytics_core::intensity::metrics::{
    facility_efficiency, intensity_metrics, EfficiencyBenchmarks, FacilityMetrics,
};
use esg_analytics_core::intensity::ratios::{capacity_utilization, CapacityUnit};
use esg_analytics_core::Observation;

use crate::input;

/// Arguments for period-aligned intensity series
#[derive(Args)]
pub struct IntensityArgs {
    /// Path to JSON/YAML input file with `emissions`, `production` and
    /// optional `energy` observations
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for facility efficiency scoring
#[derive(Args)]
pub struct EfficiencyArgs {
    /// Path to JSON/YAML input file with `facilities` and optional `benchmarks`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CapacityUnitArg {
    Tpd,
    Tpm,
    Tpa,
    Mtpa,
}

impl From<CapacityUnitArg> for CapacityUnit {
    fn from(arg: CapacityUnitArg) -> Self {
        match arg {
            CapacityUnitArg::Tpd => CapacityUnit::TonnesPerDay,
            CapacityUnitArg::Tpm => CapacityUnit::TonnesPerMonth,
            CapacityUnitArg::Tpa => CapacityUnit::TonnesPerAnnum,
            CapacityUnitArg::Mtpa => CapacityUnit::MillionTonnesPerAnnum,
        }
    }
}

/// Arguments for capacity utilisation
#[derive(Args)]
pub struct UtilizationArgs {
    /// Annual production (t)
    #[arg(long)]
    pub production: f64,
    /// Nameplate capacity in `--unit`
    #[arg(long)]
    pub capacity: f64,
    #[arg(long, value_enum, default_value = "tpa")]
    pub unit: CapacityUnitArg,
}

#[derive(Debug, Deserialize)]
struct IntensityRequest {
    emissions: Vec<Observation>,
    production: Vec<Observation>,
    #[serde(default)]
    energy: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct EfficiencyRequest {
    facilities: Vec<FacilityMetrics>,
    #[serde(default)]
    benchmarks: EfficiencyBenchmarks,
}

pub fn run_intensity(args: IntensityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: IntensityRequest = input::read_input(args.input.as_deref(), "intensity")?;
    let metrics = intensity_metrics(&request.emissions, &request.production, &request.energy);
    Ok(serde_json::json!({ "result": metrics }))
}

pub fn run_efficiency(args: EfficiencyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: EfficiencyRequest = input::read_input(args.input.as_deref(), "efficiency")?;
    let scores = facility_efficiency(&request.facilities, &request.benchmarks);
    Ok(serde_json::json!({ "result": scores }))
}

pub fn run_utilization(args: UtilizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.capacity <= 0.0 {
        return Err("--capacity must be positive".into());
    }
    let utilization = capacity_utilization(args.production, args.capacity, args.unit.into());
    Ok(serde_json::json!({
        "result": {
            "capacity_utilization": utilization,
            "annual_capacity": args.capacity * CapacityUnit::from(args.unit).annual_factor(),
        }
    }))
}
