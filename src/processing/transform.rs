//! Single-field record transformation.

use std::fmt;
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Record, Value};

use super::Processor;

type TransformFn = dyn Fn(&Value) -> PipelineResult<Value> + Send + Sync;

/// Replaces one field of every record with `f(original value)`.
///
/// Every other field is copied unchanged. The input records are only borrowed, so the caller's
/// data is never touched.
#[derive(Clone)]
pub struct TransformProcessor {
    field: String,
    label: Option<String>,
    func: Arc<TransformFn>,
}

impl TransformProcessor {
    /// Create a transform from an infallible function.
    pub fn new<F>(field: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::try_new(field, move |v| Ok(func(v)))
    }

    /// Create a transform from a fallible function. Errors abort processing.
    pub fn try_new<F>(field: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> PipelineResult<Value> + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            label: None,
            func: Arc::new(func),
        }
    }

    /// Create a transform over numeric values.
    ///
    /// Accepts `Int64` and `Float64` inputs and always produces `Float64`. Any other input is a
    /// [`PipelineError::TypeMismatch`].
    pub fn numeric<F>(field: impl Into<String>, func: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let field = field.into();
        let err_field = field.clone();
        Self::try_new(field, move |v| match v.as_f64() {
            Some(x) => Ok(Value::Float64(func(x))),
            None => Err(PipelineError::TypeMismatch {
                field: err_field.clone(),
                expected: "number",
                found: v.type_name(),
            }),
        })
    }

    /// Attach a description of the function, shown in [`Processor::name`].
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Field being replaced.
    pub fn field(&self) -> &str {
        &self.field
    }

    fn transform_record(&self, record: &Record) -> PipelineResult<Record> {
        let replacement = (self.func)(record.require(&self.field)?)?;
        let mut out = record.clone();
        out.insert(self.field.clone(), replacement);
        Ok(out)
    }
}

impl fmt::Debug for TransformProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformProcessor")
            .field("field", &self.field)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Processor for TransformProcessor {
    fn name(&self) -> String {
        match &self.label {
            Some(label) => format!("transform({}: {label})", self.field),
            None => format!("transform({})", self.field),
        }
    }

    fn process(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        records.iter().map(|r| self.transform_record(r)).collect()
    }
}
