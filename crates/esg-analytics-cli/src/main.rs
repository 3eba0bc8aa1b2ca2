mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use esg_analytics_core::config::AnalyticsConfig;

use commands::aggregation::{AggregateArgs, EmissionsArgs};
use commands::analysis::AnalyzeArgs;
use commands::benchmark::{BenchmarkArgs, TargetArgs};
use commands::cement::CementArgs;
use commands::correlation::CorrelateArgs;
use commands::forecast::ForecastArgs;
use commands::intensity::{EfficiencyArgs, IntensityArgs, UtilizationArgs};
use commands::quality::{ConsistencyArgs, QualityArgs, RangesArgs};
use commands::seasonal::SeasonalArgs;
use commands::trend::TrendArgs;

/// Emissions quantification and time-series analytics
#[derive(Parser)]
#[command(
    name = "esga",
    version,
    about = "Emissions quantification and time-series analytics",
    long_about = "A CLI for ESG emissions analytics over JSON or YAML records: \
                  period aggregation, intensity ratios, trends, seasonality, \
                  ensemble forecasts, benchmarking and data quality checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Analytics thresholds (JSON or YAML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bucket observations by month, quarter or year
    Aggregate(AggregateArgs),
    /// Quantify emissions and energy from consumption records
    Emissions(EmissionsArgs),
    /// Carbon and energy intensity per period
    Intensity(IntensityArgs),
    /// Score facilities against efficiency benchmarks
    Efficiency(EfficiencyArgs),
    /// Capacity utilisation from annual production
    Utilization(UtilizationArgs),
    /// Trend direction, smoothing, reversals and growth rates
    Trend(TrendArgs),
    /// Seasonal decomposition and monthly profile
    Seasonal(SeasonalArgs),
    /// Pearson correlation of two period-aligned series
    Correlate(CorrelateArgs),
    /// Ensemble forecast
    Forecast(ForecastArgs),
    /// Position a value against benchmarks, industry references and peers
    Benchmark(BenchmarkArgs),
    /// Evaluate progress and feasibility of a target
    Target(TargetArgs),
    /// Data quality assessment of an observation list
    Quality(QualityArgs),
    /// Cross-record consistency checks
    Consistency(ConsistencyArgs),
    /// Plausibility of reported utilisation and intensity
    Ranges(RangesArgs),
    /// Full time-series report
    Analyze(AnalyzeArgs),
    /// Clinker calcination CO2
    Cement(CementArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Aggregate(args) => commands::aggregation::run_aggregate(args),
        Commands::Emissions(args) => commands::aggregation::run_emissions(args),
        Commands::Intensity(args) => commands::intensity::run_intensity(args),
        Commands::Efficiency(args) => commands::intensity::run_efficiency(args),
        Commands::Utilization(args) => commands::intensity::run_utilization(args),
        Commands::Trend(args) => commands::trend::run_trend(args, &config),
        Commands::Seasonal(args) => commands::seasonal::run_seasonal(args, &config),
        Commands::Correlate(args) => commands::correlation::run_correlate(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args, &config),
        Commands::Benchmark(args) => commands::benchmark::run_benchmark(args),
        Commands::Target(args) => commands::benchmark::run_target(args, &config),
        Commands::Quality(args) => commands::quality::run_quality(args, &config),
        Commands::Consistency(args) => commands::quality::run_consistency(args),
        Commands::Ranges(args) => commands::quality::run_ranges(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args, &config),
        Commands::Cement(args) => commands::cement::run_cement(args),
        Commands::Version => {
            println!("esga {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn load_config(path: Option<&str>) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let config: AnalyticsConfig = match path {
        Some(path) => input::file::read_document(path)?,
        None => AnalyticsConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
