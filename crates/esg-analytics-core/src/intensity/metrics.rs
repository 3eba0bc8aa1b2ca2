use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::intensity::ratios::intensity;
use crate::stats::{mean, ratio};
use crate::types::{month_name, period_key, Observation, Percent, Quantity};

// ---------------------------------------------------------------------------
// Types: Intensity series
// ---------------------------------------------------------------------------

/// Intensity for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityPoint {
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_name: Option<String>,
    /// numerator / production
    pub value: f64,
    /// Emissions or energy for the period
    pub numerator: Quantity,
    pub production: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityMetrics {
    pub carbon_intensity: Vec<IntensityPoint>,
    pub energy_intensity: Vec<IntensityPoint>,
    /// Sum of emissions over sum of production across the matched periods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_carbon_intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_energy_intensity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Types: Facility efficiency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBenchmarks {
    /// kgCO2e per tonne
    #[serde(default = "default_carbon_benchmark")]
    pub carbon_intensity: f64,
    /// MJ per tonne
    #[serde(default = "default_energy_benchmark")]
    pub energy_intensity: f64,
    /// Optimal capacity utilisation (%)
    #[serde(default = "default_utilization_benchmark")]
    pub capacity_utilization: Percent,
}

fn default_carbon_benchmark() -> f64 {
    900.0
}
fn default_energy_benchmark() -> f64 {
    3500.0
}
fn default_utilization_benchmark() -> f64 {
    80.0
}

impl Default for EfficiencyBenchmarks {
    fn default() -> Self {
        EfficiencyBenchmarks {
            carbon_intensity: default_carbon_benchmark(),
            energy_intensity: default_energy_benchmark(),
            capacity_utilization: default_utilization_benchmark(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityMetrics {
    pub facility_id: String,
    #[serde(default)]
    pub carbon_intensity: f64,
    #[serde(default)]
    pub energy_intensity: f64,
    #[serde(default)]
    pub capacity_utilization: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl PerformanceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            PerformanceLevel::Excellent
        } else if score >= 80.0 {
            PerformanceLevel::Good
        } else if score >= 70.0 {
            PerformanceLevel::Average
        } else if score >= 60.0 {
            PerformanceLevel::BelowAverage
        } else {
            PerformanceLevel::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityEfficiency {
    pub facility_id: String,
    pub carbon_efficiency: f64,
    pub energy_efficiency: f64,
    pub capacity_efficiency: f64,
    /// Mean of the non-zero component scores
    pub overall_score: f64,
    pub performance_level: PerformanceLevel,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Join emission and energy series with production by period.
///
/// Each input is summed per period key first, so several records of the
/// same month collapse into one. Only periods with positive production
/// produce a point; the overall intensities cover those periods only.
pub fn intensity_metrics(
    emissions: &[Observation],
    production: &[Observation],
    energy: &[Observation],
) -> IntensityMetrics {
    let production_by_period = sum_by_period(production);

    let carbon = join_with_production(emissions, &production_by_period);
    let energy_points = join_with_production(energy, &production_by_period);

    tracing::trace!(
        carbon_points = carbon.len(),
        energy_points = energy_points.len(),
        "computed intensity series"
    );

    IntensityMetrics {
        overall_carbon_intensity: overall(&carbon),
        overall_energy_intensity: overall(&energy_points),
        carbon_intensity: carbon,
        energy_intensity: energy_points,
    }
}

/// Score facilities against efficiency benchmarks.
///
/// Intensity scores fall by one point per percent above the benchmark and
/// floor at `0`. Capacity scores rise toward the optimal utilisation and
/// lose one point per percentage point of over-utilisation.
pub fn facility_efficiency(
    facilities: &[FacilityMetrics],
    benchmarks: &EfficiencyBenchmarks,
) -> Vec<FacilityEfficiency> {
    facilities
        .iter()
        .map(|f| {
            let carbon_efficiency =
                lower_is_better_score(f.carbon_intensity, benchmarks.carbon_intensity);
            let energy_efficiency =
                lower_is_better_score(f.energy_intensity, benchmarks.energy_intensity);
            let capacity_efficiency =
                utilization_score(f.capacity_utilization, benchmarks.capacity_utilization);

            let scored: Vec<f64> = [carbon_efficiency, energy_efficiency, capacity_efficiency]
                .into_iter()
                .filter(|s| *s > 0.0)
                .collect();
            let overall_score = mean(&scored);

            FacilityEfficiency {
                facility_id: f.facility_id.clone(),
                carbon_efficiency,
                energy_efficiency,
                capacity_efficiency,
                overall_score,
                performance_level: PerformanceLevel::from_score(overall_score),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn sum_by_period(observations: &[Observation]) -> BTreeMap<(i32, Option<u32>), Quantity> {
    let mut map = BTreeMap::new();
    for obs in observations {
        *map.entry((obs.year, obs.month)).or_insert(0.0) += obs.value_or_zero();
    }
    map
}

fn join_with_production(
    series: &[Observation],
    production: &BTreeMap<(i32, Option<u32>), Quantity>,
) -> Vec<IntensityPoint> {
    sum_by_period(series)
        .into_iter()
        .filter_map(|((year, month), numerator)| {
            let prod = production.get(&(year, month)).copied().unwrap_or(0.0);
            (prod > 0.0).then(|| IntensityPoint {
                period: period_key(year, month),
                year,
                month,
                month_name: month.map(|m| month_name(m).to_string()),
                value: intensity(numerator, prod),
                numerator,
                production: prod,
            })
        })
        .collect()
}

fn overall(points: &[IntensityPoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let numerator: f64 = points.iter().map(|p| p.numerator).sum();
    let production: f64 = points.iter().map(|p| p.production).sum();
    Some(ratio(numerator, production))
}

fn lower_is_better_score(value: f64, benchmark: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    (100.0 - ratio(value - benchmark, benchmark) * 100.0).max(0.0)
}

fn utilization_score(utilization: Percent, optimal: Percent) -> f64 {
    if utilization <= 0.0 {
        0.0
    } else if utilization <= optimal {
        ratio(utilization, optimal) * 100.0
    } else {
        (100.0 - (utilization - optimal)).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_emissions() -> Vec<Observation> {
        vec![
            Observation::monthly(2024, 1, 900.0),
            Observation::monthly(2024, 1, 100.0),
            Observation::monthly(2024, 2, 500.0),
            Observation::monthly(2024, 3, 700.0),
        ]
    }

    fn sample_production() -> Vec<Observation> {
        vec![
            Observation::monthly(2024, 1, 2.0),
            Observation::monthly(2024, 2, 0.0),
            Observation::monthly(2024, 3, 1.0),
        ]
    }

    #[test]
    fn test_intensity_series_skips_zero_production() {
        let m = intensity_metrics(&sample_emissions(), &sample_production(), &[]);
        assert_eq!(m.carbon_intensity.len(), 2);
        assert_eq!(m.carbon_intensity[0].period, "2024-01");
        assert_eq!(m.carbon_intensity[0].value, 500.0);
        assert_eq!(m.carbon_intensity[1].value, 700.0);
        // (1000 + 700) / (2 + 1)
        let overall = m.overall_carbon_intensity.unwrap();
        assert!((overall - 1700.0 / 3.0).abs() < 1e-9);
        assert!(m.energy_intensity.is_empty());
        assert_eq!(m.overall_energy_intensity, None);
    }

    #[test]
    fn test_energy_intensity_series() {
        let energy = vec![Observation::monthly(2024, 3, 3500.0)];
        let m = intensity_metrics(&[], &sample_production(), &energy);
        assert_eq!(m.energy_intensity[0].value, 3500.0);
        assert_eq!(m.energy_intensity[0].month_name.as_deref(), Some("Mar"));
    }

    #[test]
    fn test_facility_efficiency_at_benchmark() {
        let f = FacilityMetrics {
            facility_id: "plant-a".into(),
            carbon_intensity: 900.0,
            energy_intensity: 3500.0,
            capacity_utilization: 80.0,
        };
        let out = facility_efficiency(&[f], &EfficiencyBenchmarks::default());
        assert_eq!(out[0].carbon_efficiency, 100.0);
        assert_eq!(out[0].energy_efficiency, 100.0);
        assert_eq!(out[0].capacity_efficiency, 100.0);
        assert_eq!(out[0].performance_level, PerformanceLevel::Excellent);
    }

    #[test]
    fn test_facility_efficiency_penalties() {
        let f = FacilityMetrics {
            facility_id: "plant-b".into(),
            carbon_intensity: 1080.0,
            energy_intensity: 0.0,
            capacity_utilization: 95.0,
        };
        let out = facility_efficiency(&[f], &EfficiencyBenchmarks::default());
        // 20% above benchmark
        assert!((out[0].carbon_efficiency - 80.0).abs() < 1e-9);
        assert_eq!(out[0].energy_efficiency, 0.0);
        assert_eq!(out[0].capacity_efficiency, 85.0);
        // only the two non-zero scores count
        assert!((out[0].overall_score - 82.5).abs() < 1e-9);
        assert_eq!(out[0].performance_level, PerformanceLevel::Good);
    }

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_score(72.0), PerformanceLevel::Average);
        assert_eq!(PerformanceLevel::from_score(60.0), PerformanceLevel::BelowAverage);
        assert_eq!(PerformanceLevel::from_score(10.0), PerformanceLevel::Poor);
    }
}
