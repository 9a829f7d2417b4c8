//! Unified ingestion entrypoint.
//!
//! Most callers should use [`load_records`], which reads a file into a `Vec<Record>` ready to
//! be passed to [`crate::pipeline::Pipeline::run`].
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//! - If [`IngestionOptions::retry`] is set, I/O failures are retried under that policy.

use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::execution::{RetryPolicy, retry_when};
use crate::types::Record;

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling [`load_records`].
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// If set, I/O errors are retried under this policy. Parse errors never are.
    pub retry: Option<RetryPolicy>,
}

/// Read records from `path`.
///
/// ```no_run
/// use record_pipeline::ingestion::{load_records, IngestionOptions};
///
/// # fn main() -> Result<(), record_pipeline::PipelineError> {
/// let records = load_records("sales.csv", &IngestionOptions::default())?;
/// println!("rows={}", records.len());
/// # Ok(())
/// # }
/// ```
pub fn load_records(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> PipelineResult<Vec<Record>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let load_once = |_attempt: u32| match format {
        IngestionFormat::Csv => csv::records_from_csv_path(path),
        IngestionFormat::Json => json::records_from_json_path(path),
    };

    let records = match &options.retry {
        Some(policy) => retry_when(policy, is_transient, load_once)?,
        None => load_once(1)?,
    };

    debug!(path = %path.display(), ?format, rows = records.len(), "records loaded");
    Ok(records)
}

fn is_transient(e: &PipelineError) -> bool {
    match e {
        PipelineError::Io(_) => true,
        PipelineError::Csv(err) => matches!(err.kind(), ::csv::ErrorKind::Io(_)),
        _ => false,
    }
}

fn infer_format_from_path(path: &Path) -> PipelineResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            PipelineError::invalid_input(format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ))
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| {
        PipelineError::invalid_input(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{IngestionFormat, infer_format_from_path, is_transient};
    use crate::error::PipelineError;
    use std::path::Path;

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("ndjson"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("parquet"), None);
    }

    #[test]
    fn infer_format_requires_known_extension() {
        assert_eq!(
            infer_format_from_path(Path::new("data/sales.json")).unwrap(),
            IngestionFormat::Json
        );
        assert!(infer_format_from_path(Path::new("data/sales")).is_err());
        assert!(infer_format_from_path(Path::new("data/sales.xlsx")).is_err());
    }

    #[test]
    fn only_io_errors_are_transient() {
        let io = PipelineError::Io(std::io::Error::other("disk hiccup"));
        assert!(is_transient(&io));
        assert!(!is_transient(&PipelineError::invalid_input("bad")));
    }
}
