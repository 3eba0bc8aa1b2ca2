use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::seasonal::month_or_position;
use crate::stats::mean;
use crate::types::{month_name, SeriesPoint};

/// Index (scaled by 100) above which a month is a seasonal peak.
const PEAK_INDEX: f64 = 110.0;
/// Index (scaled by 100) below which a month is a seasonal trough.
const TROUGH_INDEX: f64 = 90.0;
const NEUTRAL_INDEX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Peak,
    Trough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    pub month: u32,
    pub month_name: String,
    pub kind: PatternKind,
    pub index: f64,
    /// index - 100
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeasonalIndex {
    pub month: u32,
    pub month_name: String,
    pub average: f64,
    /// Month average relative to the mean of month averages, x100
    pub seasonal_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub has_pattern: bool,
    /// Peaks and troughs, largest deviation first
    pub patterns: Vec<SeasonalPattern>,
    pub indices: Vec<MonthlySeasonalIndex>,
    pub overall_average: f64,
    /// Mean squared distance of the indices from 100
    pub seasonal_variance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trough_month: Option<u32>,
}

impl SeasonalProfile {
    fn empty() -> Self {
        SeasonalProfile {
            has_pattern: false,
            patterns: Vec::new(),
            indices: Vec::new(),
            overall_average: 0.0,
            seasonal_variance: 0.0,
            peak_month: None,
            trough_month: None,
        }
    }

    /// Seasonal index (x100) for `month`, 100 when the month was not seen.
    pub fn index_for(&self, month: u32) -> f64 {
        self.indices
            .iter()
            .find(|m| m.month == month)
            .map(|m| m.seasonal_index)
            .unwrap_or(NEUTRAL_INDEX)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Month-average seasonal profile.
///
/// Needs `config.seasonal_naive_min_periods` points. A series whose month
/// averages do not have a positive mean has no meaningful profile and keeps
/// every index at 100.
pub fn seasonal_profile(series: &[SeriesPoint], config: &AnalyticsConfig) -> SeasonalProfile {
    if series.len() < config.seasonal_naive_min_periods {
        tracing::debug!(
            points = series.len(),
            required = config.seasonal_naive_min_periods,
            "seasonal profile skipped: not enough periods"
        );
        return SeasonalProfile::empty();
    }

    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (i, point) in series.iter().enumerate() {
        by_month
            .entry(month_or_position(point.month, i))
            .or_default()
            .push(point.value);
    }
    let averages: BTreeMap<u32, f64> = by_month.iter().map(|(m, v)| (*m, mean(v))).collect();
    let overall_average = mean(&averages.values().copied().collect::<Vec<_>>());

    let indices: Vec<MonthlySeasonalIndex> = averages
        .iter()
        .map(|(&month, &average)| MonthlySeasonalIndex {
            month,
            month_name: month_name(month).to_string(),
            average,
            seasonal_index: if overall_average > 0.0 {
                average / overall_average * 100.0
            } else {
                NEUTRAL_INDEX
            },
        })
        .collect();

    let mut patterns: Vec<SeasonalPattern> = indices
        .iter()
        .filter_map(|m| {
            let kind = if m.seasonal_index > PEAK_INDEX {
                PatternKind::Peak
            } else if m.seasonal_index < TROUGH_INDEX {
                PatternKind::Trough
            } else {
                return None;
            };
            Some(SeasonalPattern {
                month: m.month,
                month_name: m.month_name.clone(),
                kind,
                index: m.seasonal_index,
                deviation: m.seasonal_index - NEUTRAL_INDEX,
            })
        })
        .collect();
    patterns.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));

    let deviations: Vec<f64> = indices
        .iter()
        .map(|m| (m.seasonal_index - NEUTRAL_INDEX).powi(2))
        .collect();
    let seasonal_variance = mean(&deviations);

    let peak_month = indices
        .iter()
        .max_by(|a, b| a.seasonal_index.total_cmp(&b.seasonal_index))
        .map(|m| m.month);
    let trough_month = indices
        .iter()
        .min_by(|a, b| a.seasonal_index.total_cmp(&b.seasonal_index))
        .map(|m| m.month);

    SeasonalProfile {
        has_pattern: seasonal_variance > config.seasonal_pattern_variance,
        patterns,
        indices,
        overall_average,
        seasonal_variance,
        peak_month,
        trough_month,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_year(values: [f64; 12]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint::new(2024, Some(i as u32 + 1), v))
            .collect()
    }

    #[test]
    fn test_profile_requires_twelve_points() {
        let config = AnalyticsConfig::default();
        let short: Vec<SeriesPoint> = sample_year([100.0; 12]).into_iter().take(11).collect();
        let p = seasonal_profile(&short, &config);
        assert!(!p.has_pattern);
        assert!(p.indices.is_empty());
        assert_eq!(p.index_for(3), 100.0);
    }

    #[test]
    fn test_flat_profile() {
        let config = AnalyticsConfig::default();
        let p = seasonal_profile(&sample_year([50.0; 12]), &config);
        assert_eq!(p.indices.len(), 12);
        assert!(p.patterns.is_empty());
        assert_eq!(p.seasonal_variance, 0.0);
        assert!(!p.has_pattern);
    }

    #[test]
    fn test_peaks_and_troughs() {
        let config = AnalyticsConfig::default();
        let mut values = [100.0; 12];
        values[0] = 40.0; // Jan trough
        values[6] = 160.0; // Jul peak
        values[7] = 130.0; // Aug peak
        let p = seasonal_profile(&sample_year(values), &config);
        // overall average is 1230 / 12 = 102.5
        assert!((p.overall_average - 102.5).abs() < 1e-9);
        assert_eq!(p.patterns.len(), 3);
        assert_eq!(p.patterns[0].month, 1);
        assert_eq!(p.patterns[0].kind, PatternKind::Trough);
        assert_eq!(p.patterns[1].month, 7);
        assert_eq!(p.peak_month, Some(7));
        assert_eq!(p.trough_month, Some(1));
        assert!(p.has_pattern);
        assert!((p.index_for(7) - 160.0 / 102.5 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_series_keeps_neutral_indices() {
        let config = AnalyticsConfig::default();
        let p = seasonal_profile(&sample_year([0.0; 12]), &config);
        assert!(p.indices.iter().all(|m| m.seasonal_index == 100.0));
        assert!(!p.has_pattern);
    }
}
