//! Zero-guarded ratios.
//!
//! Every function here returns `0` instead of dividing by a zero (or
//! negative) denominator and never produces `NaN`. Whether a `0` means
//! "zero" or "not available" is left to the caller.

use serde::{Deserialize, Serialize};

use crate::stats::{clamp_pct, guard, ratio};
use crate::types::{Percent, Quantity};

/// Unit in which a production capacity is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityUnit {
    TonnesPerDay,
    TonnesPerMonth,
    #[default]
    TonnesPerAnnum,
    /// Mtpa, the usual unit for cement plants
    MillionTonnesPerAnnum,
}

impl CapacityUnit {
    /// Factor that converts a capacity in this unit to tonnes per annum.
    pub fn annual_factor(&self) -> f64 {
        match self {
            CapacityUnit::TonnesPerDay => 365.0,
            CapacityUnit::TonnesPerMonth => 12.0,
            CapacityUnit::TonnesPerAnnum => 1.0,
            CapacityUnit::MillionTonnesPerAnnum => 1_000_000.0,
        }
    }
}

pub fn intensity(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator)
}

/// Emissions per unit of production.
pub fn carbon_intensity(emissions: Quantity, production: Quantity) -> f64 {
    ratio(emissions, production)
}

/// Energy per unit of production.
pub fn energy_intensity(energy: Quantity, production: Quantity) -> f64 {
    ratio(energy, production)
}

/// Annual production as a share of annualised capacity, clamped to
/// `[0, 100]`.
pub fn capacity_utilization(
    actual_production: Quantity,
    capacity: Quantity,
    unit: CapacityUnit,
) -> Percent {
    let annual_capacity = capacity * unit.annual_factor();
    clamp_pct(ratio(actual_production, annual_capacity) * 100.0)
}

/// Percentage saved against a baseline cost.
pub fn cost_savings(baseline_cost: f64, current_cost: f64) -> Percent {
    ratio(baseline_cost - current_cost, baseline_cost) * 100.0
}

pub fn roi(benefits: f64, costs: f64) -> Percent {
    ratio(benefits - costs, costs) * 100.0
}

/// Direction-aware progress from `baseline` toward `target`, clamped to
/// `[0, 100]`.
///
/// A target below the baseline is a reduction target. A target equal to the
/// baseline is degenerate and reports `0`.
pub fn target_progress(baseline: f64, current: f64, target: f64) -> Percent {
    if target == baseline {
        return 0.0;
    }
    let progress = if target < baseline {
        ratio(baseline - current, baseline - target)
    } else {
        ratio(current - baseline, target - baseline)
    };
    clamp_pct(progress * 100.0)
}

/// Elapsed share of a `[start_year, end_year]` window. An empty or
/// inverted window counts as complete.
pub fn time_progress(start_year: i32, end_year: i32, current_year: i32) -> Percent {
    let total = end_year - start_year;
    if total <= 0 {
        return 100.0;
    }
    clamp_pct(f64::from(current_year - start_year) / f64::from(total) * 100.0)
}

/// Percentage growth from `previous` to `current`.
///
/// With `periods > 1` the growth is annualised geometrically over that many
/// periods. `None` when there is no usable previous value.
pub fn growth_rate(current: f64, previous: f64, periods: u32) -> Option<Percent> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    let rate = if periods <= 1 {
        (current - previous) / previous * 100.0
    } else {
        ((current / previous).powf(1.0 / f64::from(periods)) - 1.0) * 100.0
    };
    rate.is_finite().then_some(rate)
}

/// Compound annual growth rate in percent, `0` for a zero start value or a
/// zero horizon.
pub fn cagr(end_value: f64, begin_value: f64, years: f64) -> Percent {
    if begin_value == 0.0 || years == 0.0 {
        return 0.0;
    }
    guard(((end_value / begin_value).powf(1.0 / years) - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_zero_guard() {
        for x in [0.0, 1.0, -3.5, 1e12] {
            assert_eq!(intensity(x, 0.0), 0.0);
        }
        assert_eq!(carbon_intensity(900.0, 1.0), 900.0);
        assert_eq!(energy_intensity(3500.0, 0.0), 0.0);
    }

    #[test]
    fn test_capacity_utilization_mtpa() {
        let u = capacity_utilization(2_500_000.0, 2.5, CapacityUnit::MillionTonnesPerAnnum);
        assert_eq!(u, 100.0);
    }

    #[test]
    fn test_capacity_utilization_units() {
        // 3650 t against 20 t/day = 7300 t/yr
        let u = capacity_utilization(3650.0, 20.0, CapacityUnit::TonnesPerDay);
        assert!((u - 50.0).abs() < 1e-9);
        let u = capacity_utilization(600.0, 100.0, CapacityUnit::TonnesPerMonth);
        assert!((u - 50.0).abs() < 1e-9);
        assert_eq!(capacity_utilization(5000.0, 1000.0, CapacityUnit::TonnesPerAnnum), 100.0);
        assert_eq!(capacity_utilization(-5.0, 1000.0, CapacityUnit::TonnesPerAnnum), 0.0);
        assert_eq!(capacity_utilization(5.0, 0.0, CapacityUnit::TonnesPerAnnum), 0.0);
    }

    #[test]
    fn test_target_progress_reduction() {
        assert_eq!(target_progress(800.0, 720.0, 600.0), 40.0);
    }

    #[test]
    fn test_target_progress_increase() {
        assert_eq!(target_progress(20.0, 35.0, 50.0), 50.0);
    }

    #[test]
    fn test_target_progress_clamped_and_degenerate() {
        assert_eq!(target_progress(800.0, 900.0, 600.0), 0.0);
        assert_eq!(target_progress(800.0, 500.0, 600.0), 100.0);
        assert_eq!(target_progress(800.0, 123.0, 800.0), 0.0);
    }

    #[test]
    fn test_time_progress() {
        assert_eq!(time_progress(2020, 2030, 2025), 50.0);
        assert_eq!(time_progress(2020, 2030, 2040), 100.0);
        assert_eq!(time_progress(2020, 2030, 2010), 0.0);
        assert_eq!(time_progress(2030, 2030, 2010), 100.0);
    }

    #[test]
    fn test_cost_savings_and_roi() {
        assert_eq!(cost_savings(200.0, 150.0), 25.0);
        assert_eq!(cost_savings(0.0, 150.0), 0.0);
        assert_eq!(roi(150.0, 100.0), 50.0);
        assert_eq!(roi(150.0, 0.0), 0.0);
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(150.0, 100.0, 1), Some(50.0));
        assert_eq!(growth_rate(150.0, 0.0, 1), None);
        // 121 over two periods from 100 is 10% per period
        let annualised = growth_rate(121.0, 100.0, 2).unwrap();
        assert!((annualised - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cagr() {
        let c = cagr(200.0, 100.0, 1.0);
        assert!((c - 100.0).abs() < 1e-9);
        assert_eq!(cagr(200.0, 0.0, 5.0), 0.0);
        assert_eq!(cagr(200.0, 100.0, 0.0), 0.0);
    }
}
