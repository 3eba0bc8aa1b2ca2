use serde::{Deserialize, Serialize};

use crate::conversion::units::{EmissionRecord, ProductionRecord};

/// Baseline and target years of a reduction or growth target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPeriod {
    pub baseline_year: i32,
    pub target_year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyInput {
    #[serde(default)]
    pub emissions: Vec<EmissionRecord>,
    #[serde(default)]
    pub production: Vec<ProductionRecord>,
    #[serde(default)]
    pub targets: Vec<TargetPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub issues: Vec<String>,
}

/// Cross-field sanity rules over a batch of records.
///
/// Only values that are present are checked; absent fields are a
/// completeness concern. Records are numbered from 1 in the issue text.
pub fn check_consistency(input: &ConsistencyInput) -> ConsistencyReport {
    let mut issues = Vec::new();

    for (i, record) in input.emissions.iter().enumerate() {
        let n = i + 1;
        if record.consumption.is_some()
            && record.emission_factor.is_some()
            && record.emissions() < 0.0
        {
            issues.push(format!("Emission record {n}: Negative emissions value"));
        }
        if record.consumption.is_some_and(|c| c <= 0.0) {
            issues.push(format!("Emission record {n}: Zero or negative consumption"));
        }
        if record.emission_factor.is_some_and(|f| f <= 0.0) {
            issues.push(format!("Emission record {n}: Zero or negative emission factor"));
        }
    }

    for (i, record) in input.production.iter().enumerate() {
        if record.production.is_some_and(|p| p < 0.0) {
            issues.push(format!("Production record {}: Negative production value", i + 1));
        }
    }

    for (i, target) in input.targets.iter().enumerate() {
        if target.baseline_year >= target.target_year {
            issues.push(format!(
                "Target {}: Baseline year must be before target year",
                i + 1
            ));
        }
    }

    ConsistencyReport {
        is_consistent: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_emission(consumption: Option<f64>, factor: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            year: 2024,
            month: Some(1),
            consumption,
            emission_factor: factor,
            heat_content: None,
            scope: None,
            resource_category: None,
            resource_name: None,
            facility_id: None,
        }
    }

    #[test]
    fn test_consistent_batch() {
        let input = ConsistencyInput {
            emissions: vec![sample_emission(Some(1000.0), Some(0.85))],
            production: vec![ProductionRecord {
                year: 2024,
                month: Some(1),
                production: Some(5000.0),
                facility_id: None,
            }],
            targets: vec![TargetPeriod {
                baseline_year: 2020,
                target_year: 2030,
            }],
        };
        let r = check_consistency(&input);
        assert!(r.is_consistent);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn test_issues_are_collected_not_raised() {
        let input = ConsistencyInput {
            emissions: vec![
                sample_emission(Some(-10.0), Some(0.5)),
                sample_emission(None, Some(0.0)),
            ],
            production: vec![ProductionRecord {
                year: 2024,
                month: None,
                production: Some(-1.0),
                facility_id: None,
            }],
            targets: vec![TargetPeriod {
                baseline_year: 2030,
                target_year: 2030,
            }],
        };
        let r = check_consistency(&input);
        assert!(!r.is_consistent);
        assert_eq!(
            r.issues,
            vec![
                "Emission record 1: Negative emissions value",
                "Emission record 1: Zero or negative consumption",
                "Emission record 2: Zero or negative emission factor",
                "Production record 1: Negative production value",
                "Target 1: Baseline year must be before target year",
            ]
        );
    }

    #[test]
    fn test_missing_values_are_not_inconsistent() {
        let input = ConsistencyInput {
            emissions: vec![sample_emission(None, None)],
            ..Default::default()
        };
        assert!(check_consistency(&input).is_consistent);
    }
}
