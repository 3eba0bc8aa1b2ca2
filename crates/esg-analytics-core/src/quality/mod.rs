pub mod completeness;
pub mod consistency;
pub mod integrity;
pub mod outliers;
pub mod ranges;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::aggregation::period::Granularity;
use crate::config::AnalyticsConfig;
use crate::error::EsgAnalyticsError;
use crate::types::{quarter_of, with_metadata, ComputationOutput, Observation, Percent, SeriesPoint};
use crate::EsgAnalyticsResult;

use self::completeness::data_completeness;
use self::integrity::{check_period_fields, validate_time_series, DataDefect, TimeSeriesIntegrity};
use self::outliers::{detect_anomalies, detect_outliers, Anomaly, OutlierReport};

/// Completeness below which a warning is raised.
const LOW_COMPLETENESS_PCT: f64 = 80.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_granularity() -> Granularity {
    Granularity::Monthly
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityInput {
    pub observations: Vec<Observation>,
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,
    /// Observations expected for the reporting window. Defaults to every
    /// period from the first to the last observation, per dimension.
    #[serde(default)]
    pub expected_count: Option<usize>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub completeness: Percent,
    pub expected_count: usize,
    pub defects: Vec<DataDefect>,
    pub outliers: OutlierReport,
    pub integrity: TimeSeriesIntegrity,
    pub anomalies: Vec<Anomaly>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every quality check over one observation list.
///
/// Defects are reported, never raised; only an invalid configuration is an
/// error.
pub fn assess_data_quality(
    input: &DataQualityInput,
) -> EsgAnalyticsResult<ComputationOutput<DataQualityReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;
    if input.expected_count == Some(0) && !input.observations.is_empty() {
        return Err(EsgAnalyticsError::InvalidInput {
            field: "expected_count".into(),
            reason: "Expected count must be positive when observations are supplied.".into(),
        });
    }
    if input.observations.is_empty() {
        warnings.push("No observations supplied".to_string());
    }

    // -- Field defects --------------------------------------------------------
    let defects = check_period_fields(&input.observations, input.granularity);
    if !defects.is_empty() {
        warnings.push(format!("{} malformed observation field(s)", defects.len()));
    }

    // -- Outliers -------------------------------------------------------------
    let values: Vec<Option<f64>> = input.observations.iter().map(|o| o.value).collect();
    let outliers = detect_outliers(&values, config.outlier_z_threshold);
    if !outliers.excluded.is_empty() {
        warnings.push(format!(
            "{} non-numeric value(s) excluded from statistics",
            outliers.excluded.len()
        ));
    }

    // -- Completeness ---------------------------------------------------------
    let expected_count = input
        .expected_count
        .unwrap_or_else(|| expected_periods(&input.observations, input.granularity));
    let completeness = data_completeness(outliers.numeric_count, expected_count);
    if completeness < LOW_COMPLETENESS_PCT {
        warnings.push(format!("Low data completeness ({completeness:.0}%)"));
    }

    // -- Integrity ------------------------------------------------------------
    let integrity = validate_time_series(&input.observations, config.max_gap_months);
    warnings.extend(integrity.issues.iter().cloned());

    // -- Anomalies ------------------------------------------------------------
    let anomalies = detect_anomalies(&clean_series(&input.observations), &config);
    if input.observations.len() < config.anomaly_min_points {
        warnings.push(format!(
            "Anomaly detection skipped: {} observations < {}",
            input.observations.len(),
            config.anomaly_min_points
        ));
    }

    tracing::debug!(
        observations = input.observations.len(),
        defects = defects.len(),
        completeness,
        "data quality assessed"
    );

    let output = DataQualityReport {
        completeness,
        expected_count,
        defects,
        outliers,
        integrity,
        anomalies,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "granularity": input.granularity,
        "outlier_z_threshold": config.outlier_z_threshold,
        "anomaly_high_z": config.anomaly_high_z,
        "anomaly_min_points": config.anomaly_min_points,
        "max_gap_months": config.max_gap_months,
        "expected_count_supplied": input.expected_count.is_some()
    });

    Ok(with_metadata(
        "Data quality assessment (completeness, z-score outliers, period integrity)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Number of periods spanned by the observations, times the number of
/// dimensions present.
fn expected_periods(observations: &[Observation], granularity: Granularity) -> usize {
    let ordinals: Vec<i64> = observations
        .iter()
        .filter_map(|o| period_ordinal(o, granularity))
        .collect();
    let (Some(first), Some(last)) = (ordinals.iter().min(), ordinals.iter().max()) else {
        return 0;
    };
    let dimensions: BTreeSet<Option<&str>> =
        observations.iter().map(|o| o.dimension.as_deref()).collect();
    (last - first + 1) as usize * dimensions.len().max(1)
}

fn period_ordinal(obs: &Observation, granularity: Granularity) -> Option<i64> {
    let year = i64::from(obs.year);
    match (granularity, obs.month) {
        (Granularity::Yearly, _) => Some(year),
        (Granularity::Monthly, Some(m @ 1..=12)) => Some(year * 12 + i64::from(m) - 1),
        (Granularity::Quarterly, Some(m @ 1..=12)) => {
            Some(year * 4 + i64::from(quarter_of(m)) - 1)
        }
        _ => None,
    }
}

/// Finite observations with a usable period, in chronological order.
fn clean_series(observations: &[Observation]) -> Vec<SeriesPoint> {
    let mut series: Vec<SeriesPoint> = observations
        .iter()
        .filter(|o| o.value.is_some_and(f64::is_finite))
        .filter(|o| o.month.map_or(true, |m| (1..=12).contains(&m)))
        .map(SeriesPoint::from)
        .collect();
    series.sort_by_key(|p| (p.year, p.month.unwrap_or(0)));
    series
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(observations: Vec<Observation>) -> DataQualityInput {
        DataQualityInput {
            observations,
            granularity: Granularity::Monthly,
            expected_count: None,
            config: None,
        }
    }

    #[test]
    fn test_clean_year_of_data() {
        let obs: Vec<Observation> = (1..=12)
            .map(|m| Observation::monthly(2024, m, 100.0 + m as f64))
            .collect();
        let out = assess_data_quality(&sample_input(obs)).unwrap();
        let r = &out.result;
        assert_eq!(r.expected_count, 12);
        assert_eq!(r.completeness, 100.0);
        assert!(r.defects.is_empty());
        assert!(r.integrity.is_valid);
        assert!(r.anomalies.is_empty());
        assert!(out.warnings.is_empty());
        assert_eq!(out.metadata.precision, "ieee754_f64");
    }

    #[test]
    fn test_missing_values_reduce_completeness() {
        let mut obs: Vec<Observation> = (1..=4).map(|m| Observation::monthly(2024, m, 50.0)).collect();
        obs[1].value = None;
        let out = assess_data_quality(&sample_input(obs)).unwrap();
        assert_eq!(out.result.completeness, 75.0);
        assert_eq!(out.result.outliers.excluded, vec![1]);
        assert_eq!(out.result.defects.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("excluded")));
        assert!(out.warnings.iter().any(|w| w.contains("Low data completeness")));
    }

    #[test]
    fn test_explicit_expected_count() {
        let obs: Vec<Observation> = (1..=6).map(|m| Observation::monthly(2024, m, 50.0)).collect();
        let mut input = sample_input(obs);
        input.expected_count = Some(12);
        let out = assess_data_quality(&input).unwrap();
        assert_eq!(out.result.completeness, 50.0);
    }

    #[test]
    fn test_expected_periods_per_dimension() {
        let obs = vec![
            Observation::monthly(2024, 1, 1.0).with_dimension("a"),
            Observation::monthly(2024, 3, 1.0).with_dimension("b"),
        ];
        assert_eq!(expected_periods(&obs, Granularity::Monthly), 6);
        assert_eq!(expected_periods(&obs, Granularity::Quarterly), 2);
        assert_eq!(expected_periods(&obs, Granularity::Yearly), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut input = sample_input(vec![Observation::monthly(2024, 1, 1.0)]);
        input.config = Some(AnalyticsConfig {
            ema_alpha: 2.0,
            ..AnalyticsConfig::default()
        });
        match assess_data_quality(&input).unwrap_err() {
            EsgAnalyticsError::InvalidInput { field, .. } => assert_eq!(field, "ema_alpha"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let out = assess_data_quality(&sample_input(Vec::new())).unwrap();
        assert_eq!(out.result.expected_count, 0);
        assert!(out.warnings.iter().any(|w| w.contains("No observations")));
    }
}
