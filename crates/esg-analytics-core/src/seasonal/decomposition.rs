//! Multiplicative seasonal decomposition.
//!
//! The trend is the 12-period trailing moving average. Ratios of actual to
//! trend are averaged per calendar month; a month without any ratio counts
//! as 1.0. All twelve are then normalised to average 1.0. The seasonal
//! component is the trend scaled by the month's index minus the trend
//! itself, and the residual is what is left.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::seasonal::month_or_position;
use crate::stats::mean;
use crate::trend::smoothing::moving_average_values;
use crate::types::{month_name, SeriesPoint};

const TREND_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthIndex {
    pub month: u32,
    pub month_name: String,
    pub index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDecomposition {
    /// Input points with `trend`, `seasonal`, `seasonal_index` and
    /// `residual` filled in. Empty when the series is too short.
    pub points: Vec<SeriesPoint>,
    /// Normalised index for each of the twelve months, empty when no period
    /// had a non-zero trend
    pub seasonal_indices: Vec<MonthIndex>,
    /// Mean squared distance of the indices from 1.0
    pub seasonal_variance: f64,
    pub has_seasonality: bool,
}

impl SeasonalDecomposition {
    fn empty() -> Self {
        SeasonalDecomposition {
            points: Vec::new(),
            seasonal_indices: Vec::new(),
            seasonal_variance: 0.0,
            has_seasonality: false,
        }
    }
}

/// Split `series` into trend, seasonal and residual components.
///
/// Needs `config.decomposition_min_periods` points; shorter input returns an
/// empty decomposition with `has_seasonality = false` instead of failing.
pub fn seasonal_decomposition(
    series: &[SeriesPoint],
    config: &AnalyticsConfig,
) -> SeasonalDecomposition {
    if series.len() < config.decomposition_min_periods {
        tracing::debug!(
            points = series.len(),
            required = config.decomposition_min_periods,
            "seasonal decomposition skipped: not enough periods"
        );
        return SeasonalDecomposition::empty();
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let trend = moving_average_values(&values, TREND_WINDOW);

    let mut ratios: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (i, point) in series.iter().enumerate() {
        if trend[i] != 0.0 {
            let ratio = point.value / trend[i];
            if ratio.is_finite() {
                ratios
                    .entry(month_or_position(point.month, i))
                    .or_default()
                    .push(ratio);
            }
        }
    }

    let mut indices: BTreeMap<u32, f64> = ratios
        .iter()
        .map(|(month, r)| (*month, mean(r)))
        .collect();
    if !indices.is_empty() {
        // a month whose trend is always zero has a neutral raw index
        for month in 1..=12 {
            indices.entry(month).or_insert(1.0);
        }
    }
    let average_index = mean(&indices.values().copied().collect::<Vec<_>>());
    if average_index != 0.0 {
        for index in indices.values_mut() {
            *index /= average_index;
        }
    }

    let points = series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let index = indices
                .get(&month_or_position(p.month, i))
                .copied()
                .unwrap_or(1.0);
            let seasonal = trend[i] * index - trend[i];
            let mut point = p.clone();
            point.trend = Some(trend[i]);
            point.seasonal = Some(seasonal);
            point.seasonal_index = Some(index);
            point.residual = Some(p.value - trend[i] - seasonal);
            point
        })
        .collect();

    let deviations: Vec<f64> = indices.values().map(|idx| (idx - 1.0).powi(2)).collect();
    let seasonal_variance = mean(&deviations);

    SeasonalDecomposition {
        points,
        seasonal_indices: indices
            .into_iter()
            .map(|(month, index)| MonthIndex {
                month,
                month_name: month_name(month).to_string(),
                index,
            })
            .collect(),
        seasonal_variance,
        has_seasonality: seasonal_variance > config.seasonal_significance,
    }
}
