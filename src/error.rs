use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by processors, pipelines, ingestion and config loading.
///
/// A single error enum is shared across the crate so that a failing step can be surfaced to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input is empty or is not a sequence of records.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A record does not carry a field the processor needs.
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// A field value has the wrong type for the requested operation.
    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A pipeline step failed; the run was aborted at this step.
    #[error("step {index} ({name}) failed: {source}")]
    StepFailed {
        index: usize,
        name: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// A pipeline config could not be turned into a pipeline.
    #[error("config error: {message}")]
    Config { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON ingestion or config error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Shorthand for [`PipelineError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`PipelineError::MissingField`].
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns the innermost error, unwrapping any [`PipelineError::StepFailed`] layers.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            Self::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
