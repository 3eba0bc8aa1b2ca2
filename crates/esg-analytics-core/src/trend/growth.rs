//! Year-over-year and quarter-over-quarter growth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregation::period::{aggregate_by_period, AggregationFn, Granularity};
use crate::stats::ratio;
use crate::types::{Observation, Percent, Quantity, SeriesPoint};
use crate::EsgAnalyticsResult;

/// Growth of one quarter's average over the previous quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterGrowth {
    pub period: String,
    pub year: i32,
    pub quarter: u32,
    pub average: Quantity,
    pub total: Quantity,
    pub data_points: usize,
    pub qoq_growth_rate: Percent,
    pub previous_quarter_value: Quantity,
    pub absolute_change: Quantity,
}

/// Year-over-year growth per calendar month.
///
/// Points are grouped by month and ordered by year inside each group; each
/// point after the first in its group is compared with the entry before it
/// and copied into the output with `yoy_growth_rate`,
/// `previous_year_value` and `absolute_change` set. A non-positive previous
/// value gives a growth rate of `0`. Yearly points (no month) form a group
/// of their own. Output is sorted by `(year, month)`.
pub fn yoy_growth(series: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut by_month: BTreeMap<Option<u32>, Vec<&SeriesPoint>> = BTreeMap::new();
    for point in series {
        by_month.entry(point.month).or_default().push(point);
    }

    let mut out = Vec::new();
    for points in by_month.values_mut() {
        points.sort_by_key(|p| p.year);
        for pair in points.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            let mut point = current.clone();
            point.yoy_growth_rate = Some(growth_pct(current.value, previous.value));
            point.previous_year_value = Some(previous.value);
            point.absolute_change = Some(current.value - previous.value);
            out.push(point);
        }
    }

    out.sort_by_key(|p| (p.year, p.month.unwrap_or(0)));
    out
}

/// Quarter-over-quarter growth of quarterly averages.
///
/// Every point needs a month; one without is malformed and fails.
pub fn qoq_growth(series: &[SeriesPoint]) -> EsgAnalyticsResult<Vec<QuarterGrowth>> {
    let observations: Vec<Observation> = series.iter().map(Observation::from).collect();
    let buckets = aggregate_by_period(&observations, Granularity::Quarterly, false)?;

    Ok(buckets
        .windows(2)
        .map(|pair| {
            let previous = pair[0].aggregate(AggregationFn::Average);
            let current = &pair[1];
            let average = current.aggregate(AggregationFn::Average);
            QuarterGrowth {
                period: current.period.clone(),
                year: current.year,
                quarter: current.quarter.unwrap_or_default(),
                average,
                total: current.total,
                data_points: current.count,
                qoq_growth_rate: growth_pct(average, previous),
                previous_quarter_value: previous,
                absolute_change: average - previous,
            }
        })
        .collect())
}

fn growth_pct(current: f64, previous: f64) -> Percent {
    ratio(current - previous, previous) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsgAnalyticsError;

    fn sample_series() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint::new(2023, Some(1), 100.0),
            SeriesPoint::new(2023, Some(2), 120.0),
            SeriesPoint::new(2024, Some(1), 150.0),
        ]
    }

    #[test]
    fn test_yoy_growth_month_one() {
        let yoy = yoy_growth(&sample_series());
        assert_eq!(yoy.len(), 1);
        assert_eq!(yoy[0].period, "2024-01");
        assert_eq!(yoy[0].yoy_growth_rate, Some(50.0));
        assert_eq!(yoy[0].previous_year_value, Some(100.0));
        assert_eq!(yoy[0].absolute_change, Some(50.0));
    }

    #[test]
    fn test_yoy_zero_previous_is_zero_growth() {
        let series = vec![
            SeriesPoint::new(2022, Some(5), 0.0),
            SeriesPoint::new(2023, Some(5), 40.0),
        ];
        let yoy = yoy_growth(&series);
        assert_eq!(yoy[0].yoy_growth_rate, Some(0.0));
        assert_eq!(yoy[0].absolute_change, Some(40.0));
    }

    #[test]
    fn test_yoy_yearly_series() {
        let series = vec![
            SeriesPoint::new(2022, None, 200.0),
            SeriesPoint::new(2023, None, 150.0),
            SeriesPoint::new(2021, None, 100.0),
        ];
        let yoy = yoy_growth(&series);
        assert_eq!(yoy.len(), 2);
        assert_eq!(yoy[0].year, 2022);
        assert_eq!(yoy[0].yoy_growth_rate, Some(100.0));
        assert_eq!(yoy[1].yoy_growth_rate, Some(-25.0));
    }

    #[test]
    fn test_qoq_growth_on_averages() {
        let series = vec![
            SeriesPoint::new(2023, Some(1), 10.0),
            SeriesPoint::new(2023, Some(2), 30.0),
            SeriesPoint::new(2023, Some(4), 30.0),
            SeriesPoint::new(2023, Some(11), 15.0),
        ];
        let qoq = qoq_growth(&series).unwrap();
        assert_eq!(qoq.len(), 2);
        assert_eq!(qoq[0].period, "2023-Q2");
        assert_eq!(qoq[0].previous_quarter_value, 20.0);
        assert_eq!(qoq[0].qoq_growth_rate, 50.0);
        assert_eq!(qoq[1].period, "2023-Q4");
        assert_eq!(qoq[1].qoq_growth_rate, -50.0);
        assert_eq!(qoq[1].data_points, 1);
    }

    #[test]
    fn test_qoq_requires_months() {
        let series = vec![SeriesPoint::new(2023, None, 10.0)];
        match qoq_growth(&series).unwrap_err() {
            EsgAnalyticsError::MalformedObservation { field, .. } => assert_eq!(field, "month"),
            other => panic!("Expected MalformedObservation, got {other:?}"),
        }
    }

    #[test]
    fn test_qoq_empty() {
        assert!(qoq_growth(&[]).unwrap().is_empty());
    }
}
