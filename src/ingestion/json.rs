//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Field values must be scalars (`null`, numbers, bools, strings). Field order in the source is
//! kept in the resulting [`Record`]s.

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Record;

/// Read records from a JSON or NDJSON file.
pub fn records_from_json_path(path: impl AsRef<Path>) -> PipelineResult<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    records_from_json_str(&text)
}

/// Read records from an in-memory JSON or NDJSON string.
pub fn records_from_json_str(input: &str) -> PipelineResult<Vec<Record>> {
    let trimmed = input.trim();
    match trimmed.chars().next() {
        None => Err(PipelineError::invalid_input("json input is empty")),
        Some('[') => serde_json::from_str::<Vec<Record>>(trimmed).map_err(not_records),
        Some('{') => match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => Ok(vec![record]),
            // Several top-level objects: fall back to NDJSON.
            Err(_) => records_from_ndjson(trimmed),
        },
        Some(_) => Err(PipelineError::invalid_input(
            "json must be an object, an array of objects, or NDJSON",
        )),
    }
}

fn records_from_ndjson(input: &str) -> PipelineResult<Vec<Record>> {
    let mut records = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<Record>(line).map_err(|e| {
            PipelineError::invalid_input(format!("invalid ndjson at line {}: {}", i + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Shape errors become [`PipelineError::InvalidInput`]; malformed JSON stays a JSON error.
fn not_records(e: serde_json::Error) -> PipelineError {
    if e.is_data() {
        PipelineError::invalid_input(format!("expected a sequence of records: {e}"))
    } else {
        PipelineError::Json(e)
    }
}
