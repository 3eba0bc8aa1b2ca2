use clap::Args;
use serde_json::Value;

use esg_analytics_core::config::AnalyticsConfig;
use esg_analytics_core::trend::direction::{linear_trend, simple_trend, variability_metrics};
use esg_analytics_core::trend::growth::{qoq_growth, yoy_growth};
use esg_analytics_core::trend::smoothing::{
    detect_trend_changes, exponential_moving_average, moving_average,
};

use super::SeriesRequest;
use crate::input;

/// Arguments for trend and growth analysis
#[derive(Args)]
pub struct TrendArgs {
    /// Path to JSON/YAML input file with `observations`
    #[arg(long)]
    pub input: Option<String>,
    /// Window of the variability metrics
    #[arg(long, default_value_t = 12)]
    pub window: usize,
}

pub fn run_trend(
    args: TrendArgs,
    config: &AnalyticsConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SeriesRequest = input::read_input(args.input.as_deref(), "trend analysis")?;
    let series = request.series()?;
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();

    let smoothed = exponential_moving_average(
        &moving_average(&series, config.moving_average_window),
        config.ema_alpha,
    );
    let qoq = if series.iter().all(|p| p.month.is_some()) {
        qoq_growth(&series)?
    } else {
        Vec::new()
    };

    Ok(serde_json::json!({
        "result": {
            "simple_trend": simple_trend(&series, config),
            "linear_trend": linear_trend(&values),
            "variability": variability_metrics(&values, args.window, config),
            "trend_changes": detect_trend_changes(&series, config.trend_sensitivity),
            "yoy": yoy_growth(&series),
            "qoq": qoq,
            "series": smoothed,
        }
    }))
}
