//! Record processors.
//!
//! A [`Processor`] turns one sequence of [`Record`]s into another. Processors never mutate
//! their input: they borrow it and return freshly allocated records.
//!
//! Currently implemented:
//!
//! - [`FilterProcessor`]: keeps records whose field equals a value
//! - [`TransformProcessor`]: replaces one field via a pure function
//! - [`AggregateProcessor`]: group-by + reduction (sum by default)
//! - [`reduce()`]: whole-sequence reductions (count/sum/min/max/mean)
//!
//! ## Example: filter → transform → aggregate
//!
//! ```rust
//! use record_pipeline::processing::{
//!     AggregateProcessor, FilterProcessor, Processor, TransformProcessor,
//! };
//! use record_pipeline::record;
//! use record_pipeline::types::Value;
//!
//! let records = vec![
//!     record! { "status" => "active", "revenue" => 100.0, "region" => "North" },
//!     record! { "status" => "inactive", "revenue" => 50.0, "region" => "North" },
//!     record! { "status" => "active", "revenue" => 25.0, "region" => "South" },
//! ];
//!
//! let active = FilterProcessor::new("status", "active").process(&records).unwrap();
//! let doubled = TransformProcessor::numeric("revenue", |x| x * 2.0).process(&active).unwrap();
//! let totals = AggregateProcessor::new("region", "revenue").process(&doubled).unwrap();
//!
//! assert_eq!(totals.len(), 2);
//! assert_eq!(totals[0].get("revenue"), Some(&Value::Float64(200.0)));
//! ```

pub mod aggregate;
pub mod filter;
pub mod reduce;
pub mod transform;

pub use aggregate::AggregateProcessor;
pub use filter::FilterProcessor;
pub use reduce::{ReduceOp, reduce};
pub use transform::TransformProcessor;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Record;

/// A pipeline stage: transforms one record sequence into another.
///
/// Implementations must treat `records` as read-only and return new records.
pub trait Processor: Send + Sync {
    /// Human-readable step name, used in pipeline summaries and events.
    fn name(&self) -> String;

    /// Process `records` into a new sequence.
    ///
    /// This does not call [`Processor::validate_input`]; use [`Processor::apply`] for the
    /// checked form.
    fn process(&self, records: &[Record]) -> PipelineResult<Vec<Record>>;

    /// Reject inputs this processor cannot meaningfully run on.
    ///
    /// The default rejects an empty sequence.
    fn validate_input(&self, records: &[Record]) -> PipelineResult<()> {
        validate_non_empty(records)
    }

    /// [`Processor::validate_input`] followed by [`Processor::process`].
    fn apply(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        self.validate_input(records)?;
        self.process(records)
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn process(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        (**self).process(records)
    }

    fn validate_input(&self, records: &[Record]) -> PipelineResult<()> {
        (**self).validate_input(records)
    }
}

pub(crate) fn validate_non_empty(records: &[Record]) -> PipelineResult<()> {
    if records.is_empty() {
        return Err(PipelineError::invalid_input("expected a non-empty sequence of records"));
    }
    Ok(())
}

/// Numeric view of `record[field]`, or the matching shape error.
pub(crate) fn numeric_field(record: &Record, field: &str) -> PipelineResult<f64> {
    let value = record.require(field)?;
    value.as_f64().ok_or_else(|| PipelineError::TypeMismatch {
        field: field.to_string(),
        expected: "number",
        found: value.type_name(),
    })
}
