//! Structural checks on observation lists: period fields, gaps and
//! duplicate periods.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::aggregation::period::Granularity;
use crate::error::EsgAnalyticsError;
use crate::types::{to_series, Observation, SeriesPoint};
use crate::EsgAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One malformed field of one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDefect {
    pub index: usize,
    pub field: String,
    pub reason: String,
}

impl From<DataDefect> for EsgAnalyticsError {
    fn from(defect: DataDefect) -> Self {
        EsgAnalyticsError::MalformedObservation {
            index: defect.index,
            field: defect.field,
            reason: defect.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesIntegrity {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_records: usize,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    pub duplicate_count: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Every period-field defect in `observations` for the requested
/// granularity, in input order.
pub fn check_period_fields(observations: &[Observation], granularity: Granularity) -> Vec<DataDefect> {
    let mut defects = Vec::new();
    for (index, obs) in observations.iter().enumerate() {
        match obs.month {
            None if granularity.requires_month() => defects.push(DataDefect {
                index,
                field: "month".into(),
                reason: format!("Month is required for {granularity:?} aggregation."),
            }),
            Some(m) if !(1..=12).contains(&m) => defects.push(DataDefect {
                index,
                field: "month".into(),
                reason: format!("Month {m} is outside 1-12."),
            }),
            _ => {}
        }
        match obs.value {
            None => defects.push(DataDefect {
                index,
                field: "value".into(),
                reason: "Value is missing.".into(),
            }),
            Some(v) if !v.is_finite() => defects.push(DataDefect {
                index,
                field: "value".into(),
                reason: "Value is not a finite number.".into(),
            }),
            _ => {}
        }
    }
    defects
}

/// Monthly when any observation carries a month, yearly otherwise.
pub fn implied_granularity(observations: &[Observation]) -> Granularity {
    if observations.iter().any(|o| o.month.is_some()) {
        Granularity::Monthly
    } else {
        Granularity::Yearly
    }
}

/// Chronological series of `observations` after rejecting the first
/// period-field defect, so no missing value or bad month is read as zero.
pub fn checked_series(observations: &[Observation]) -> EsgAnalyticsResult<Vec<SeriesPoint>> {
    let granularity = implied_granularity(observations);
    if let Some(defect) = check_period_fields(observations, granularity).into_iter().next() {
        return Err(defect.into());
    }
    Ok(to_series(observations))
}

/// Gaps and duplicate periods in a series.
///
/// Consecutive monthly periods more than `max_gap_months` apart are a gap;
/// yearly periods are a gap when a whole year is skipped. Duplicates are
/// keyed by period and dimension so grouped data is not flagged.
pub fn validate_time_series(observations: &[Observation], max_gap_months: u32) -> TimeSeriesIntegrity {
    let mut issues = Vec::new();

    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|o| (o.year, o.month.unwrap_or(0)));

    for pair in sorted.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let gap = match (prev.month, curr.month) {
            (Some(pm), Some(cm)) => {
                months_between(prev.year, pm, curr.year, cm) > i64::from(max_gap_months)
            }
            _ => curr.year - prev.year > 1,
        };
        if gap {
            issues.push(format!(
                "Gap in data between {} and {}",
                prev.period(),
                curr.period()
            ));
        }
    }

    let mut seen: HashMap<(String, Option<&str>), usize> = HashMap::new();
    for (index, obs) in observations.iter().enumerate() {
        match seen.entry((obs.period(), obs.dimension.as_deref())) {
            Entry::Occupied(first) => issues.push(format!(
                "Duplicate data for period {} at indices {} and {index}",
                first.key().0,
                first.get()
            )),
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    TimeSeriesIntegrity {
        is_valid: issues.is_empty(),
        issues,
        total_records: observations.len(),
        start_period: sorted.first().map(|o| o.period()),
        end_period: sorted.last().map(|o| o.period()),
        duplicate_count: observations.len() - seen.len(),
    }
}

fn months_between(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> i64 {
    i64::from(to_year - from_year) * 12 + i64::from(to_month) - i64::from(from_month)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_field_defects() {
        let obs = vec![
            Observation::monthly(2024, 1, 10.0),
            Observation::yearly(2024, 10.0),
            Observation::monthly(2024, 13, 10.0),
            Observation {
                year: 2024,
                month: Some(2),
                value: None,
                dimension: None,
            },
            Observation::monthly(2024, 3, f64::INFINITY),
        ];
        let defects = check_period_fields(&obs, Granularity::Monthly);
        let found: Vec<(usize, &str)> = defects
            .iter()
            .map(|d| (d.index, d.field.as_str()))
            .collect();
        assert_eq!(found, vec![(1, "month"), (2, "month"), (3, "value"), (4, "value")]);
    }

    #[test]
    fn test_yearly_granularity_allows_missing_month() {
        let obs = vec![Observation::yearly(2023, 1.0), Observation::yearly(2024, 2.0)];
        assert!(check_period_fields(&obs, Granularity::Yearly).is_empty());
    }

    #[test]
    fn test_defect_converts_to_error() {
        let defect = DataDefect {
            index: 4,
            field: "month".into(),
            reason: "Month is missing.".into(),
        };
        match EsgAnalyticsError::from(defect) {
            EsgAnalyticsError::MalformedObservation { index, field, .. } => {
                assert_eq!(index, 4);
                assert_eq!(field, "month");
            }
            other => panic!("Expected MalformedObservation, got {other:?}"),
        }
    }

    #[test]
    fn test_checked_series_rejects_null_value() {
        let mut obs: Vec<Observation> = (1..=8).map(|m| Observation::monthly(2024, m, 10.0)).collect();
        for o in obs.iter_mut().skip(5) {
            o.value = None;
        }
        match checked_series(&obs).unwrap_err() {
            EsgAnalyticsError::MalformedObservation { index, field, .. } => {
                assert_eq!(index, 5);
                assert_eq!(field, "value");
            }
            other => panic!("Expected MalformedObservation, got {other:?}"),
        }
    }

    #[test]
    fn test_checked_series_rejects_month_zero() {
        let obs = vec![Observation::monthly(2024, 1, 1.0), Observation::monthly(2024, 0, 1.0)];
        assert!(checked_series(&obs).is_err());
    }

    #[test]
    fn test_checked_series_accepts_clean_yearly_data() {
        let obs = vec![Observation::yearly(2024, 2.0), Observation::yearly(2023, 1.0)];
        assert_eq!(implied_granularity(&obs), Granularity::Yearly);
        let series = checked_series(&obs).unwrap();
        assert_eq!(series[0].period, "2023");
        assert_eq!(series[1].value, 2.0);
    }

    #[test]
    fn test_gap_and_duplicate_detection() {
        let obs = vec![
            Observation::monthly(2023, 1, 1.0),
            Observation::monthly(2023, 2, 1.0),
            Observation::monthly(2023, 9, 1.0),
            Observation::monthly(2023, 2, 2.0),
        ];
        let r = validate_time_series(&obs, 3);
        assert!(!r.is_valid);
        assert_eq!(
            r.issues,
            vec![
                "Gap in data between 2023-02 and 2023-09",
                "Duplicate data for period 2023-02 at indices 1 and 3",
            ]
        );
        assert_eq!(r.duplicate_count, 1);
        assert_eq!(r.start_period.as_deref(), Some("2023-01"));
        assert_eq!(r.end_period.as_deref(), Some("2023-09"));
    }

    #[test]
    fn test_gap_across_year_boundary() {
        let obs = vec![Observation::monthly(2023, 11, 1.0), Observation::monthly(2024, 2, 1.0)];
        assert!(validate_time_series(&obs, 3).is_valid);
        let obs = vec![Observation::monthly(2023, 10, 1.0), Observation::monthly(2024, 2, 1.0)];
        assert!(!validate_time_series(&obs, 3).is_valid);
    }

    #[test]
    fn test_grouped_dimensions_are_not_duplicates() {
        let obs = vec![
            Observation::monthly(2023, 1, 1.0).with_dimension("scope1"),
            Observation::monthly(2023, 1, 1.0).with_dimension("scope2"),
        ];
        let r = validate_time_series(&obs, 3);
        assert!(r.is_valid);
        assert_eq!(r.duplicate_count, 0);
    }

    #[test]
    fn test_yearly_series_gap() {
        let obs = vec![Observation::yearly(2020, 1.0), Observation::yearly(2021, 1.0)];
        assert!(validate_time_series(&obs, 3).is_valid);
        let obs = vec![Observation::yearly(2020, 1.0), Observation::yearly(2023, 1.0)];
        assert_eq!(validate_time_series(&obs, 3).issues.len(), 1);
    }

    #[test]
    fn test_empty_series_is_valid() {
        let r = validate_time_series(&[], 3);
        assert!(r.is_valid);
        assert_eq!(r.start_period, None);
    }
}
