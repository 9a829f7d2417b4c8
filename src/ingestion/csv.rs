//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Record, Value};

/// Read records from a CSV file.
///
/// Rules:
///
/// - CSV must have headers; header names become field names, in header order.
/// - Header names must be unique.
/// - Cell types are inferred per cell (see [`infer_value`]).
pub fn records_from_csv_path(path: impl AsRef<Path>) -> PipelineResult<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    records_from_csv_reader(&mut rdr)
}

/// Read records from an existing CSV reader.
pub fn records_from_csv_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> PipelineResult<Vec<Record>> {
    let headers = rdr.headers()?.clone();
    for (i, h) in headers.iter().enumerate() {
        if headers.iter().take(i).any(|prev| prev == h) {
            return Err(PipelineError::invalid_input(format!(
                "duplicate csv header '{h}'. headers={:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let mut record = Record::with_capacity(headers.len());
        for (name, raw) in headers.iter().zip(row.iter()) {
            record.insert(name, infer_value(raw));
        }
        records.push(record);
    }
    Ok(records)
}

/// Infer a typed [`Value`] from a raw CSV cell.
///
/// - empty / whitespace → `Null`
/// - integer → `Int64`
/// - decimal number → `Float64`
/// - `true` / `false` (any case) → `Bool`
/// - anything else → `Utf8` (trimmed)
pub fn infer_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int64(v);
    }
    // `f64::from_str` also accepts "inf"/"nan"; only treat digit-bearing cells as numbers.
    if trimmed.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(v) = trimmed.parse::<f64>() {
            return Value::Float64(v);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Utf8(trimmed.to_owned()),
    }
}
