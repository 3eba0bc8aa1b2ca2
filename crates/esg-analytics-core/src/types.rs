use serde::{Deserialize, Serialize};

/// Emission totals, consumption, production and energy are all plain doubles.
pub type Quantity = f64;

/// Percentages expressed on a 0-100 scale.
pub type Percent = f64;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One raw measurement handed over by the persistence layer.
///
/// `month` is absent for data that is already yearly. `value` is optional
/// because upstream records may carry nulls; those are never silently
/// dropped, see [`default_to_zero`] and the quality module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default)]
    pub value: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

impl Observation {
    pub fn monthly(year: i32, month: u32, value: Quantity) -> Self {
        Observation {
            year,
            month: Some(month),
            value: Some(value),
            dimension: None,
        }
    }

    pub fn yearly(year: i32, value: Quantity) -> Self {
        Observation {
            year,
            month: None,
            value: Some(value),
            dimension: None,
        }
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    /// The observation value with missing or non-finite values read as zero.
    pub fn value_or_zero(&self) -> Quantity {
        default_to_zero(self.value)
    }

    pub fn period(&self) -> String {
        period_key(self.year, self.month)
    }
}

/// A point of a derived series. Every engine copies the incoming point and
/// only fills in its own fields, so stages can be chained in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub value: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_average: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponential_moving_average: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoy_growth_rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_year_value: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_change: Option<Quantity>,
}

impl SeriesPoint {
    pub fn new(year: i32, month: Option<u32>, value: Quantity) -> Self {
        SeriesPoint {
            period: period_key(year, month),
            year,
            month,
            value,
            dimension: None,
            moving_average: None,
            exponential_moving_average: None,
            trend: None,
            seasonal: None,
            seasonal_index: None,
            residual: None,
            yoy_growth_rate: None,
            previous_year_value: None,
            absolute_change: None,
        }
    }
}

impl From<&Observation> for SeriesPoint {
    fn from(obs: &Observation) -> Self {
        let mut point = SeriesPoint::new(obs.year, obs.month, obs.value_or_zero());
        point.dimension = obs.dimension.clone();
        point
    }
}

impl From<&SeriesPoint> for Observation {
    fn from(point: &SeriesPoint) -> Self {
        Observation {
            year: point.year,
            month: point.month,
            value: Some(point.value),
            dimension: point.dimension.clone(),
        }
    }
}

/// Convert observations into a chronologically sorted series.
pub fn to_series(observations: &[Observation]) -> Vec<SeriesPoint> {
    let mut series: Vec<SeriesPoint> = observations.iter().map(SeriesPoint::from).collect();
    series.sort_by(|a, b| (a.year, a.month.unwrap_or(0)).cmp(&(b.year, b.month.unwrap_or(0))));
    series
}

/// The single place where a missing or non-numeric operand becomes `0`.
///
/// Callers that must not understate a total check for `None` before reaching
/// for this.
pub fn default_to_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// `"YYYY-MM"` for monthly data, `"YYYY"` for yearly data. Lexicographic
/// order of these keys is chronological order.
pub fn period_key(year: i32, month: Option<u32>) -> String {
    match month {
        Some(m) => format!("{year}-{m:02}"),
        None => year.to_string(),
    }
}

pub fn quarter_key(year: i32, quarter: u32) -> String {
    format!("{year}-Q{quarter}")
}

/// Calendar quarter (1-4) of a month (1-12).
pub fn quarter_of(month: u32) -> u32 {
    month.div_ceil(3)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "Unknown",
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_zero_pads_month() {
        assert_eq!(period_key(2023, Some(1)), "2023-01");
        assert_eq!(period_key(2023, Some(12)), "2023-12");
        assert_eq!(period_key(2023, None), "2023");
    }

    #[test]
    fn test_period_keys_sort_chronologically() {
        let mut keys = vec![
            period_key(2024, Some(1)),
            period_key(2023, Some(11)),
            period_key(2023, Some(2)),
        ];
        keys.sort();
        assert_eq!(keys, vec!["2023-02", "2023-11", "2024-01"]);
    }

    #[test]
    fn test_quarter_of() {
        assert_eq!(quarter_of(1), 1);
        assert_eq!(quarter_of(3), 1);
        assert_eq!(quarter_of(4), 2);
        assert_eq!(quarter_of(12), 4);
    }

    #[test]
    fn test_default_to_zero() {
        assert_eq!(default_to_zero(None), 0.0);
        assert_eq!(default_to_zero(Some(f64::NAN)), 0.0);
        assert_eq!(default_to_zero(Some(4.5)), 4.5);
    }

    #[test]
    fn test_observation_deserializes_null_value() {
        let obs: Observation =
            serde_json::from_str(r#"{"year": 2023, "month": 4, "value": null}"#).unwrap();
        assert_eq!(obs.value, None);
        assert_eq!(obs.value_or_zero(), 0.0);
        assert_eq!(obs.period(), "2023-04");
    }

    #[test]
    fn test_to_series_sorts_by_period() {
        let obs = vec![
            Observation::monthly(2024, 1, 3.0),
            Observation::monthly(2023, 6, 1.0),
            Observation::monthly(2023, 12, 2.0),
        ];
        let series = to_series(&obs);
        let periods: Vec<&str> = series.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-06", "2023-12", "2024-01"]);
    }
}
