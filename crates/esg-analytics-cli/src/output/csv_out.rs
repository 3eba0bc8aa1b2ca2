use serde_json::{Map, Value};
use std::io::{self, Write};

use super::{result_of, scalar_text};

/// Write the command result as CSV to stdout.
///
/// Arrays of records become one row per record. An object result becomes
/// field/value rows, except that its first array of records is preferred
/// when present (the series of a trend or forecast, for instance).
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, result_of(value)).and_then(|()| wtr.flush().map_err(Into::into)) {
        tracing::error!(error = %e, "failed to write CSV output");
    }
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Array(items) => write_records(wtr, items),
        Value::Object(map) => match first_record_array(map) {
            Some(items) => write_records(wtr, items),
            None => {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &scalar_text(val, "")])?;
                }
                Ok(())
            }
        },
        other => wtr.write_record([scalar_text(other, "")]),
    }
}

fn first_record_array(map: &Map<String, Value>) -> Option<&[Value]> {
    map.values().find_map(|val| match val {
        Value::Array(items) if items.first().is_some_and(Value::is_object) => Some(items.as_slice()),
        _ => None,
    })
}

fn write_records<W: Write>(wtr: &mut csv::Writer<W>, items: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = items.first() else {
        for item in items {
            wtr.write_record([scalar_text(item, "")])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in items.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(|v| scalar_text(v, "")).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}
