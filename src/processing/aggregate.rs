//! Group-by aggregation.

use std::collections::HashMap;

use crate::error::PipelineResult;
use crate::types::{GroupKey, Record, Value};

use super::Processor;
use super::reduce::{Accumulator, ReduceOp};

/// Groups records by `group_by` and reduces `field` within each group.
///
/// Emits one record per distinct group key, in order of the key's first appearance:
/// `{group_by: key, field: total}`. The default reduction is [`ReduceOp::Sum`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateProcessor {
    group_by: String,
    field: String,
    op: ReduceOp,
}

impl AggregateProcessor {
    /// Sum `field` per distinct value of `group_by`.
    pub fn new(group_by: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            group_by: group_by.into(),
            field: field.into(),
            op: ReduceOp::Sum,
        }
    }

    /// Use a different reduction than sum.
    pub fn with_op(mut self, op: ReduceOp) -> Self {
        self.op = op;
        self
    }

    /// Field whose values define the groups.
    pub fn group_by(&self) -> &str {
        &self.group_by
    }

    /// Field being reduced.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Reduction applied within each group.
    pub fn op(&self) -> ReduceOp {
        self.op
    }
}

impl Processor for AggregateProcessor {
    fn name(&self) -> String {
        format!(
            "aggregate({}({}) by {})",
            self.op.as_str(),
            self.field,
            self.group_by
        )
    }

    fn process(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<(Value, Accumulator)> = Vec::new();

        for record in records {
            let key = record.require(&self.group_by)?;
            let slot = *index.entry(key.group_key()).or_insert_with(|| {
                groups.push((key.clone(), Accumulator::new(self.op)));
                groups.len() - 1
            });
            groups[slot].1.push(record, &self.field)?;
        }

        Ok(groups
            .into_iter()
            .map(|(key, acc)| {
                Record::with_capacity(2)
                    .with(self.group_by.clone(), key)
                    .with(self.field.clone(), acc.finish())
            })
            .collect())
    }
}
