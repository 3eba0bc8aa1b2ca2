use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Render a command envelope as tables.
///
/// Scalar fields of the result go in one Field/Value table; each array of
/// records (periods, forecasts, anomalies...) gets its own table underneath.
/// Warnings and methodology from a composite envelope follow.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => {
                print_section(result);
                print_envelope_notes(map);
            }
            None => print_section(value),
        },
        other => print_section(other),
    }
}

fn print_section(value: &Value) {
    match value {
        Value::Object(map) => print_object(map),
        Value::Array(items) => print_records(items),
        other => println!("{}", scalar_text(other, "null")),
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => nested.push((key, items)),
            _ => builder.push_record([key.as_str(), &cell(val)]),
        }
    }
    println!("{}", Table::from(builder));
    for (key, items) in nested {
        println!("\n{key}:");
        print_records(items);
    }
}

fn print_records(items: &[Value]) {
    let Some(Value::Object(first)) = items.first() else {
        if items.is_empty() {
            println!("(empty)");
        }
        for item in items {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in items.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(cell).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(cell)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other, "-"),
    }
}
