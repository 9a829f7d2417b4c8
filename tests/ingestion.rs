use std::time::Duration;

use record_pipeline::PipelineError;
use record_pipeline::execution::RetryPolicy;
use record_pipeline::ingestion::csv::{records_from_csv_path, records_from_csv_reader};
use record_pipeline::ingestion::json::records_from_json_path;
use record_pipeline::ingestion::{IngestionFormat, IngestionOptions, load_records};
use record_pipeline::types::Value;

#[test]
fn json_fixture_preserves_field_order_and_types() {
    let rs = records_from_json_path("tests/fixtures/sales.json").unwrap();

    assert_eq!(rs.len(), 4);
    assert_eq!(
        rs[0].field_names().collect::<Vec<_>>(),
        vec!["id", "status", "revenue", "region"]
    );
    assert_eq!(rs[0].get("id"), Some(&Value::Int64(1)));
    assert_eq!(rs[0].get("revenue"), Some(&Value::Float64(1000.0)));
}

#[test]
fn csv_and_json_fixtures_agree() {
    let from_csv = records_from_csv_path("tests/fixtures/sales.csv").unwrap();
    let from_json = records_from_json_path("tests/fixtures/sales.json").unwrap();
    assert_eq!(from_csv, from_json);
}

#[test]
fn ndjson_fixture_matches_array_fixture() {
    let opts = IngestionOptions::default();
    let nd = load_records("tests/fixtures/sales.ndjson", &opts).unwrap();
    let arr = load_records("tests/fixtures/sales.json", &opts).unwrap();
    assert_eq!(nd, arr);
}

#[test]
fn explicit_format_overrides_extension() {
    let input = "id,name\n1,Ada\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());
    let rs = records_from_csv_reader(&mut rdr).unwrap();
    assert_eq!(rs[0].get("name"), Some(&Value::from("Ada")));

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Json),
        ..Default::default()
    };
    let err = load_records("tests/fixtures/sales.csv", &opts).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { .. }));
}

#[test]
fn unknown_extension_is_invalid_input() {
    let err =
        load_records("tests/fixtures/sales.parquet", &IngestionOptions::default()).unwrap_err();
    assert!(err.to_string().contains("cannot infer format"));
}

#[test]
fn missing_file_is_retried_then_reported_as_io() {
    let opts = IngestionOptions {
        retry: Some(RetryPolicy::new(3, Duration::from_millis(5))),
        ..Default::default()
    };
    let err = load_records("tests/fixtures/does_not_exist.json", &opts).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
}
