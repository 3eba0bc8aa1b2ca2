//! Pearson correlation between two aligned series.
//!
//! Significance is a rule of thumb (`n > 10` and `|r| > 2 / sqrt(n)`), not a
//! formal hypothesis test.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EsgAnalyticsError;
use crate::stats::mean;
use crate::types::{period_key, SeriesPoint};
use crate::EsgAnalyticsResult;

const MIN_SIGNIFICANT_SAMPLE: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    None,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let abs = r.abs();
        if abs >= 0.8 {
            CorrelationStrength::VeryStrong
        } else if abs >= 0.6 {
            CorrelationStrength::Strong
        } else if abs >= 0.4 {
            CorrelationStrength::Moderate
        } else if abs >= 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub correlation: f64,
    pub strength: CorrelationStrength,
    pub is_significant: bool,
    pub sample_size: usize,
    pub direction: CorrelationDirection,
}

/// Correlation of two series joined on their period keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedCorrelation {
    #[serde(flatten)]
    pub result: CorrelationResult,
    /// Period keys present in both series, in chronological order
    pub periods: Vec<String>,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Pearson correlation of two equal-length series.
///
/// Series of different lengths are not aligned and fail with
/// [`EsgAnalyticsError::LengthMismatch`]. A constant series has no variance
/// and yields `0`.
pub fn correlation(left: &[f64], right: &[f64]) -> EsgAnalyticsResult<CorrelationResult> {
    if left.len() != right.len() {
        return Err(EsgAnalyticsError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let n = left.len();
    let mean_left = mean(left);
    let mean_right = mean(right);

    let (mut numerator, mut sum_sq_left, mut sum_sq_right) = (0.0, 0.0, 0.0);
    for (a, b) in left.iter().zip(right) {
        let dl = a - mean_left;
        let dr = b - mean_right;
        numerator += dl * dr;
        sum_sq_left += dl * dl;
        sum_sq_right += dr * dr;
    }

    let denominator = (sum_sq_left * sum_sq_right).sqrt();
    let r = if denominator > 0.0 && denominator.is_finite() {
        (numerator / denominator).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let is_significant =
        n > MIN_SIGNIFICANT_SAMPLE && r.abs() > 2.0 / (n as f64).sqrt();

    Ok(CorrelationResult {
        correlation: r,
        strength: CorrelationStrength::from_coefficient(r),
        is_significant,
        sample_size: n,
        direction: if r > 0.0 {
            CorrelationDirection::Positive
        } else if r < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::None
        },
    })
}

/// Join two series on their period key and correlate the matched values.
///
/// Duplicate keys within one series are summed first.
pub fn correlate_by_period(
    left: &[SeriesPoint],
    right: &[SeriesPoint],
) -> EsgAnalyticsResult<AlignedCorrelation> {
    let left_by_period = sum_by_period(left);
    let right_by_period = sum_by_period(right);

    let mut periods = Vec::new();
    let mut left_values = Vec::new();
    let mut right_values = Vec::new();
    for (key, value) in &left_by_period {
        if let Some(other) = right_by_period.get(key) {
            periods.push(period_key(key.0, key.1));
            left_values.push(*value);
            right_values.push(*other);
        }
    }

    let result = correlation(&left_values, &right_values)?;
    tracing::trace!(matched = periods.len(), "correlated series by period");

    Ok(AlignedCorrelation {
        result,
        unmatched_left: left_by_period.len() - periods.len(),
        unmatched_right: right_by_period.len() - periods.len(),
        periods,
    })
}

fn sum_by_period(series: &[SeriesPoint]) -> BTreeMap<(i32, Option<u32>), f64> {
    let mut map = BTreeMap::new();
    for p in series {
        *map.entry((p.year, p.month)).or_insert(0.0) += p.value;
    }
    map
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
