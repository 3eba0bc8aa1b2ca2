use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stats::clamp_pct;
use crate::types::Percent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCompleteness {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
    pub completeness: Percent,
}

/// `actual / expected * 100`, capped at 100. Nothing expected counts as
/// complete.
pub fn data_completeness(actual: usize, expected: usize) -> Percent {
    if expected == 0 {
        return 100.0;
    }
    clamp_pct(actual as f64 / expected as f64 * 100.0)
}

/// Completeness of a year's monthly reporting as of `as_of`.
///
/// In the as-of year only the months up to and including the as-of month
/// are expected; any other year expects all twelve.
pub fn monthly_completeness(months_reported: usize, year: i32, as_of: NaiveDate) -> Percent {
    let expected = if year == as_of.year() {
        as_of.month() as usize
    } else {
        12
    };
    data_completeness(months_reported, expected)
}

/// Check that every `required` field of a JSON record is present.
///
/// Fields may be dotted paths into nested objects (`"facility.id"`). A
/// field that is absent, `null` or an empty string is missing.
pub fn field_completeness(record: &Value, required: &[&str]) -> FieldCompleteness {
    let missing_fields: Vec<String> = required
        .iter()
        .filter(|field| is_blank(lookup(record, field)))
        .map(|field| field.to_string())
        .collect();

    FieldCompleteness {
        is_complete: missing_fields.is_empty(),
        completeness: data_completeness(required.len() - missing_fields.len(), required.len()),
        missing_fields,
    }
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |current, key| current.get(key))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_completeness() {
        assert_eq!(data_completeness(9, 12), 75.0);
        assert_eq!(data_completeness(14, 12), 100.0);
        assert_eq!(data_completeness(0, 0), 100.0);
    }

    #[test]
    fn test_monthly_completeness_current_year() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(monthly_completeness(3, 2024, as_of), 50.0);
        assert_eq!(monthly_completeness(6, 2023, as_of), 50.0);
    }

    #[test]
    fn test_field_completeness_nested() {
        let record = json!({
            "year": 2024,
            "month": null,
            "resource": { "name": "Coal", "category": "" }
        });
        let c = field_completeness(&record, &["year", "month", "resource.name", "resource.category"]);
        assert!(!c.is_complete);
        assert_eq!(c.missing_fields, vec!["month", "resource.category"]);
        assert_eq!(c.completeness, 50.0);
    }

    #[test]
    fn test_field_completeness_no_requirements() {
        let c = field_completeness(&json!({}), &[]);
        assert!(c.is_complete);
        assert_eq!(c.completeness, 100.0);
    }
}
