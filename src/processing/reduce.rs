//! Reduction operations over a single field.

use serde::Deserialize;

use crate::error::PipelineResult;
use crate::types::{Record, Value};

use super::numeric_field;

/// Built-in reduction operations over a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceOp {
    /// Count records carrying the field (any type).
    Count,
    /// Sum numeric values using `f64` addition.
    #[default]
    Sum,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
    /// Arithmetic mean of numeric values.
    Mean,
}

impl ReduceOp {
    /// Lowercase operation name, as used in processor names and configs.
    pub fn as_str(self) -> &'static str {
        match self {
            ReduceOp::Count => "count",
            ReduceOp::Sum => "sum",
            ReduceOp::Min => "min",
            ReduceOp::Max => "max",
            ReduceOp::Mean => "mean",
        }
    }
}

/// Running state of one reduction.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    op: ReduceOp,
    count: u64,
    acc: Option<f64>,
}

impl Accumulator {
    pub(crate) fn new(op: ReduceOp) -> Self {
        Self {
            op,
            count: 0,
            acc: None,
        }
    }

    /// Fold `record[field]` into the accumulator.
    ///
    /// `Count` only requires the field to exist; every other op requires a number.
    pub(crate) fn push(&mut self, record: &Record, field: &str) -> PipelineResult<()> {
        if self.op == ReduceOp::Count {
            record.require(field)?;
            self.count += 1;
            return Ok(());
        }

        let v = numeric_field(record, field)?;
        self.count += 1;
        self.acc = Some(match (self.op, self.acc) {
            (ReduceOp::Sum | ReduceOp::Mean, Some(a)) => a + v,
            (ReduceOp::Min, Some(a)) => a.min(v),
            (ReduceOp::Max, Some(a)) => a.max(v),
            (_, None) => v,
            (ReduceOp::Count, Some(_)) => unreachable!("count handled above"),
        });
        Ok(())
    }

    pub(crate) fn finish(&self) -> Value {
        match (self.op, self.acc) {
            (ReduceOp::Count, _) => Value::Int64(self.count as i64),
            (_, None) => Value::Null,
            (ReduceOp::Mean, Some(total)) => Value::Float64(total / self.count as f64),
            (_, Some(a)) => Value::Float64(a),
        }
    }
}

/// Reduce `field` across all `records` using a built-in [`ReduceOp`].
///
/// - `Count` returns `Int64(n)`; every record must carry the field.
/// - `Sum`/`Min`/`Max`/`Mean` return `Float64`, or `Null` for an empty input.
/// - A missing field or a non-numeric value (including `Null`) is an error.
pub fn reduce(records: &[Record], field: &str, op: ReduceOp) -> PipelineResult<Value> {
    let mut acc = Accumulator::new(op);
    for record in records {
        acc.push(record, field)?;
    }
    Ok(acc.finish())
}
