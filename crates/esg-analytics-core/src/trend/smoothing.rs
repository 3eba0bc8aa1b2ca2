//! Moving averages and trend-reversal detection.

use serde::{Deserialize, Serialize};

use crate::types::{Quantity, SeriesPoint};

/// Window of the moving average used to smooth a series before looking for
/// reversals.
const REVERSAL_SMOOTHING_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    ReversalToIncrease,
    ReversalToDecrease,
}

/// A direction flip in the smoothed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChange {
    /// Index of the point that completes the reversal window
    pub index: usize,
    pub period: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub change_type: ChangeType,
    /// |next - prev| / |prev| * 100 on the smoothed series
    pub intensity: f64,
    pub prev: Quantity,
    pub current: Quantity,
    pub next: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
    Flat,
}

impl Step {
    fn between(from: f64, to: f64) -> Self {
        if to > from {
            Step::Up
        } else if to < from {
            Step::Down
        } else {
            Step::Flat
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Trailing simple moving average over raw values.
///
/// Indices before the first full window keep their own value.
pub fn moving_average_values(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i + 1 < window {
                v
            } else {
                values[i + 1 - window..=i].iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Copy `series`, filling `moving_average` on every point.
pub fn moving_average(series: &[SeriesPoint], window: usize) -> Vec<SeriesPoint> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    series
        .iter()
        .zip(moving_average_values(&values, window))
        .map(|(p, ma)| {
            let mut point = p.clone();
            point.moving_average = Some(ma);
            point
        })
        .collect()
}

/// Exponential moving average over raw values. `alpha` is clamped to
/// `[0, 1]`.
pub fn exponential_moving_average_values(values: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    for (i, &v) in values.iter().enumerate() {
        ema = if i == 0 {
            v
        } else {
            alpha * v + (1.0 - alpha) * ema
        };
        out.push(ema);
    }
    out
}

/// Copy `series`, filling `exponential_moving_average` on every point.
pub fn exponential_moving_average(series: &[SeriesPoint], alpha: f64) -> Vec<SeriesPoint> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    series
        .iter()
        .zip(exponential_moving_average_values(&values, alpha))
        .map(|(p, ema)| {
            let mut point = p.clone();
            point.exponential_moving_average = Some(ema);
            point
        })
        .collect()
}

/// Find direction reversals in the 3-period smoothed series.
///
/// For every `i >= 2` the smoothed values at `i-2`, `i-1` and `i` are
/// compared; a strict up/down flip whose relative change from `i-2` to `i`
/// exceeds `sensitivity` (0.1 = 10%) is reported at index `i`. A zero
/// starting value has no relative change and is never reported.
pub fn detect_trend_changes(series: &[SeriesPoint], sensitivity: f64) -> Vec<TrendChange> {
    if series.len() < 3 {
        return Vec::new();
    }
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let smoothed = moving_average_values(&values, REVERSAL_SMOOTHING_WINDOW);

    let mut changes = Vec::new();
    for i in 2..smoothed.len() {
        let (prev, current, next) = (smoothed[i - 2], smoothed[i - 1], smoothed[i]);
        let before = Step::between(prev, current);
        let after = Step::between(current, next);
        if before == after || before == Step::Flat || after == Step::Flat {
            continue;
        }

        let intensity = relative_change_pct(prev, next);
        if intensity > sensitivity * 100.0 {
            let point = &series[i];
            changes.push(TrendChange {
                index: i,
                period: point.period.clone(),
                year: point.year,
                month: point.month,
                change_type: if before == Step::Up {
                    ChangeType::ReversalToDecrease
                } else {
                    ChangeType::ReversalToIncrease
                },
                intensity,
                prev,
                current,
                next,
            });
        }
    }

    tracing::trace!(points = series.len(), reversals = changes.len(), "detected trend changes");
    changes
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn relative_change_pct(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    let pct = ((to - from) / from).abs() * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
