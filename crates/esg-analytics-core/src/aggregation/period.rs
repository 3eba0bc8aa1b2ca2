//! Period bucketing of raw observations.
//!
//! Buckets are keyed by `(year, month | quarter, dimension)` and come back
//! in ascending chronological order. Totals and any [`AggregationFn`] are
//! evaluated only after every observation has been collected, over the
//! bucket items in a canonical order, so the result does not depend on the
//! order in which observations arrive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EsgAnalyticsError;
use crate::stats::mean;
use crate::types::{
    month_name, period_key, quarter_key, quarter_of, Observation, Quantity, SeriesPoint,
};
use crate::EsgAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Whether observations need a calendar month to be placed.
    pub fn requires_month(&self) -> bool {
        matches!(self, Granularity::Monthly | Granularity::Quarterly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFn {
    #[default]
    Sum,
    Average,
    Max,
    Min,
}

/// All observations that fall into one period (and dimension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    pub total: Quantity,
    pub count: usize,
    /// Items whose value was missing or non-numeric and was counted as 0
    pub missing_values: usize,
    pub items: Vec<Observation>,
}

impl PeriodBucket {
    pub fn values(&self) -> Vec<Quantity> {
        self.items.iter().map(Observation::value_or_zero).collect()
    }

    /// Apply `func` over the collected values.
    pub fn aggregate(&self, func: AggregationFn) -> Quantity {
        let values = self.values();
        if values.is_empty() {
            return 0.0;
        }
        match func {
            AggregationFn::Sum => self.total,
            AggregationFn::Average => mean(&values),
            AggregationFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregationFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// A bucket reduced to a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    pub value: Quantity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    year: i32,
    sub_period: u32,
    dimension: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Group observations into period buckets.
///
/// An empty input yields an empty output. A missing month under monthly or
/// quarterly granularity, or a month outside 1-12, is malformed input and
/// fails with [`EsgAnalyticsError::MalformedObservation`]; use
/// `quality::check_period_fields` to collect every such defect up front.
pub fn aggregate_by_period(
    observations: &[Observation],
    granularity: Granularity,
    group_by_dimension: bool,
) -> EsgAnalyticsResult<Vec<PeriodBucket>> {
    let mut groups: BTreeMap<BucketKey, Vec<Observation>> = BTreeMap::new();

    for (index, obs) in observations.iter().enumerate() {
        let sub_period = sub_period_of(index, obs, granularity)?;
        let key = BucketKey {
            year: obs.year,
            sub_period,
            dimension: if group_by_dimension {
                obs.dimension.clone()
            } else {
                None
            },
        };
        groups.entry(key).or_default().push(obs.clone());
    }

    let buckets: Vec<PeriodBucket> = groups
        .into_iter()
        .map(|(key, items)| build_bucket(key, items, granularity))
        .collect();

    tracing::trace!(
        observations = observations.len(),
        buckets = buckets.len(),
        ?granularity,
        "aggregated observations"
    );

    Ok(buckets)
}

/// Reduce each bucket with `func`.
pub fn summarize_buckets(buckets: &[PeriodBucket], func: AggregationFn) -> Vec<BucketSummary> {
    buckets
        .iter()
        .map(|b| BucketSummary {
            period: b.period.clone(),
            year: b.year,
            month: b.month,
            month_name: b.month.map(|m| month_name(m).to_string()),
            quarter: b.quarter,
            dimension: b.dimension.clone(),
            value: b.aggregate(func),
            count: b.count,
        })
        .collect()
}

/// Monthly buckets reduced with `func`, one summary per month.
pub fn monthly_aggregation(
    observations: &[Observation],
    func: AggregationFn,
) -> EsgAnalyticsResult<Vec<BucketSummary>> {
    let buckets = aggregate_by_period(observations, Granularity::Monthly, false)?;
    Ok(summarize_buckets(&buckets, func))
}

/// Turn buckets into a series whose values are the reduced bucket values.
///
/// Quarterly buckets keep their `"YYYY-Qn"` label and carry the quarter's
/// last month so that downstream month-keyed engines stay aligned.
pub fn buckets_to_series(buckets: &[PeriodBucket], func: AggregationFn) -> Vec<SeriesPoint> {
    buckets
        .iter()
        .map(|b| {
            let month = b.month.or(b.quarter.map(|q| q * 3));
            let mut point = SeriesPoint::new(b.year, month, b.aggregate(func));
            point.period = b.period.clone();
            point.dimension = b.dimension.clone();
            point
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn sub_period_of(
    index: usize,
    obs: &Observation,
    granularity: Granularity,
) -> EsgAnalyticsResult<u32> {
    if let Some(m) = obs.month {
        if !(1..=12).contains(&m) {
            return Err(EsgAnalyticsError::MalformedObservation {
                index,
                field: "month".into(),
                reason: format!("Month {m} is outside 1-12."),
            });
        }
    }
    match (granularity, obs.month) {
        (Granularity::Yearly, _) => Ok(0),
        (Granularity::Monthly, Some(m)) => Ok(m),
        (Granularity::Quarterly, Some(m)) => Ok(quarter_of(m)),
        (_, None) => Err(EsgAnalyticsError::MalformedObservation {
            index,
            field: "month".into(),
            reason: format!("Month is required for {granularity:?} aggregation."),
        }),
    }
}

fn build_bucket(key: BucketKey, mut items: Vec<Observation>, granularity: Granularity) -> PeriodBucket {
    items.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| a.value_or_zero().total_cmp(&b.value_or_zero()))
            .then_with(|| a.value.is_some().cmp(&b.value.is_some()))
            .then_with(|| a.dimension.cmp(&b.dimension))
    });

    let total: Quantity = items.iter().map(Observation::value_or_zero).sum();
    let missing_values = items
        .iter()
        .filter(|o| !matches!(o.value, Some(v) if v.is_finite()))
        .count();

    let (month, quarter) = match granularity {
        Granularity::Monthly => (Some(key.sub_period), None),
        Granularity::Quarterly => (None, Some(key.sub_period)),
        Granularity::Yearly => (None, None),
    };
    let base = match granularity {
        Granularity::Monthly => period_key(key.year, month),
        Granularity::Quarterly => quarter_key(key.year, key.sub_period),
        Granularity::Yearly => period_key(key.year, None),
    };
    let period = match &key.dimension {
        Some(d) => format!("{base}-{d}"),
        None => base,
    };

    PeriodBucket {
        period,
        year: key.year,
        month,
        quarter,
        dimension: key.dimension,
        total,
        count: items.len(),
        missing_values,
        items,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
