use serde_json::Value;

use super::{result_of, scalar_text};

/// Headline fields, most specific first. The first non-null one found in
/// the result object is printed on its own.
const HEADLINE_KEYS: [&str; 14] = [
    "corrected_direct_co2",
    "overall_carbon_intensity",
    "capacity_utilization",
    "progress_pct",
    "percentile",
    "correlation",
    "completeness",
    "is_consistent",
    "is_valid",
    "direction",
    "volatility",
    "total_emissions",
    "value",
    "overall_score",
];

/// Print just the key answer of a command.
///
/// Arrays print one line per element: `period value` when the elements are
/// series points, the compact JSON otherwise.
pub fn print_minimal(value: &Value) {
    match result_of(value) {
        Value::Object(map) => {
            if let Some(val) = HEADLINE_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|val| !val.is_null())
            {
                println!("{}", scalar_text(val, "null"));
            } else if let Some((key, val)) = map.iter().next() {
                println!("{key}: {}", scalar_text(val, "null"));
            }
        }
        Value::Array(items) => {
            for item in items {
                println!("{}", series_line(item));
            }
        }
        other => println!("{}", scalar_text(other, "null")),
    }
}

fn series_line(item: &Value) -> String {
    let period = item.get("period").and_then(Value::as_str);
    let value = item.get("value");
    match (period, value) {
        (Some(period), Some(value)) => format!("{period} {}", scalar_text(value, "null")),
        _ => scalar_text(item, "null"),
    }
}
