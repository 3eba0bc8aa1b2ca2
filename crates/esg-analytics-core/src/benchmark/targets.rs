use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::intensity::ratios::{target_progress, time_progress};
use crate::stats::ratio;
use crate::trend::direction::{value_trend, TrendDirection};
use crate::types::Percent;

/// Required annual change (%) above which a target is flagged as
/// significant.
const SIGNIFICANT_ANNUAL_CHANGE: f64 = 25.0;
/// Required annual change (%) above which a target is flagged as
/// aggressive.
const AGGRESSIVE_ANNUAL_CHANGE: f64 = 50.0;
const MAX_REASONABLE_TIMESPAN: i32 = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    EmissionsReduction,
    ProductionIncrease,
    #[default]
    General,
}

/// A baseline-to-target trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub baseline_year: i32,
    pub baseline_value: f64,
    pub target_year: i32,
    pub target_value: f64,
    #[serde(default)]
    pub kind: TargetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEvaluation {
    pub progress_pct: Percent,
    pub time_elapsed_pct: Percent,
    /// Progress keeps pace with elapsed time
    pub on_track: bool,
    /// Value on the straight line from baseline to target at the as-of year
    pub expected_value: f64,
    /// target - current, the change still to deliver
    pub remaining_gap: f64,
    pub years_remaining: i32,
    /// remaining_gap spread over the remaining years
    pub required_annual_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFeasibility {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    /// |target - baseline| / baseline / timespan * 100, with enough history
    pub required_annual_change_pct: Option<Percent>,
    pub historical_direction: Option<TrendDirection>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Progress of `current_value` along `target` as of `as_of_year`.
pub fn evaluate_target(target: &Target, current_value: f64, as_of_year: i32) -> TargetEvaluation {
    let progress_pct = target_progress(target.baseline_value, current_value, target.target_value);
    let time_elapsed_pct = time_progress(target.baseline_year, target.target_year, as_of_year);
    let expected_value = target.baseline_value
        + (target.target_value - target.baseline_value) * time_elapsed_pct / 100.0;
    let remaining_gap = target.target_value - current_value;
    let years_remaining = (target.target_year - as_of_year).max(0);
    let required_annual_change = if years_remaining > 0 {
        remaining_gap / f64::from(years_remaining)
    } else {
        remaining_gap
    };

    TargetEvaluation {
        progress_pct,
        time_elapsed_pct,
        on_track: progress_pct >= time_elapsed_pct,
        expected_value,
        remaining_gap,
        years_remaining,
        required_annual_change,
    }
}

/// Sanity and ambition checks for a target.
///
/// `historical` is the metric's history in chronological order; the
/// ambition and direction checks need at least two values. Issues make the
/// target invalid, warnings do not.
pub fn target_feasibility(
    target: &Target,
    historical: &[f64],
    config: &AnalyticsConfig,
) -> TargetFeasibility {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let timespan = target.target_year - target.baseline_year;

    let mut required_annual_change_pct = None;
    let mut historical_direction = None;
    if historical.len() >= 2 {
        let required = if timespan > 0 {
            ratio(
                (target.target_value - target.baseline_value).abs(),
                target.baseline_value.abs(),
            ) / f64::from(timespan)
                * 100.0
        } else {
            0.0
        };
        if required > AGGRESSIVE_ANNUAL_CHANGE {
            warnings.push(format!(
                "Target requires very aggressive annual changes (>{AGGRESSIVE_ANNUAL_CHANGE}% per year)"
            ));
        } else if required > SIGNIFICANT_ANNUAL_CHANGE {
            warnings.push(format!(
                "Target requires significant annual changes (>{SIGNIFICANT_ANNUAL_CHANGE}% per year)"
            ));
        }
        required_annual_change_pct = Some(required);

        let target_direction = if target.target_value > target.baseline_value {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };
        let history = value_trend(historical, config).direction;
        if history != TrendDirection::Stable && history != target_direction {
            warnings.push(format!(
                "Historical trend ({}) conflicts with target direction ({})",
                direction_label(history),
                direction_label(target_direction)
            ));
        }
        historical_direction = Some(history);
    }

    if timespan < 1 {
        issues.push("Target timespan must be at least 1 year".to_string());
    } else if timespan > MAX_REASONABLE_TIMESPAN {
        warnings.push(format!(
            "Target timespan is very long (>{MAX_REASONABLE_TIMESPAN} years)"
        ));
    }

    match target.kind {
        TargetKind::EmissionsReduction if target.target_value < 0.0 => {
            issues.push("Emissions cannot be negative".to_string());
        }
        TargetKind::ProductionIncrease if target.target_value <= target.baseline_value => {
            issues.push("Production increase target must be higher than baseline".to_string());
        }
        _ => {}
    }

    TargetFeasibility {
        is_valid: issues.is_empty(),
        issues,
        warnings,
        required_annual_change_pct,
        historical_direction,
    }
}

fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Increasing => "increasing",
        TrendDirection::Decreasing => "decreasing",
        TrendDirection::Stable => "stable",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
