//! Declarative pipeline descriptions.
//!
//! A [`PipelineConfig`] is a serde-deserializable list of built-in steps. It lets a pipeline be
//! described in a JSON file instead of code:
//!
//! ```rust
//! use record_pipeline::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{
//!   "steps": [
//!     { "kind": "filter", "field": "status", "equals": "active" },
//!     { "kind": "transform", "field": "revenue",
//!       "ops": [ { "op": "multiply", "by": 1.1 }, { "op": "round", "decimals": 2 } ] },
//!     { "kind": "aggregate", "group_by": "region", "field": "revenue" }
//!   ]
//! }"#).unwrap();
//!
//! let pipeline = config.build().unwrap();
//! assert_eq!(pipeline.len(), 3);
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::Pipeline;
use crate::processing::{
    AggregateProcessor, FilterProcessor, Processor, ReduceOp, TransformProcessor,
};
use crate::types::Value;

/// A pipeline described as data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Steps, in execution order.
    pub steps: Vec<StepConfig>,
}

/// One built-in pipeline step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum StepConfig {
    /// See [`FilterProcessor`].
    Filter { field: String, equals: Value },
    /// See [`TransformProcessor`]. `ops` are applied left to right.
    Transform { field: String, ops: Vec<TransformOp> },
    /// See [`AggregateProcessor`].
    Aggregate {
        group_by: String,
        field: String,
        #[serde(default)]
        reduce: ReduceOp,
    },
}

/// Built-in value transformations usable from a config.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum TransformOp {
    /// `x * by` (numeric).
    Multiply { by: f64 },
    /// `x + amount` (numeric).
    Add { amount: f64 },
    /// Round half away from zero to `decimals` places (numeric).
    Round { decimals: u32 },
    /// Uppercase a string.
    Uppercase,
    /// Lowercase a string.
    Lowercase,
}

impl TransformOp {
    /// Apply to one value. `field` is only used for error messages.
    pub fn apply(self, field: &str, value: &Value) -> PipelineResult<Value> {
        match self {
            TransformOp::Multiply { by } => numeric(field, value).map(|x| Value::Float64(x * by)),
            TransformOp::Add { amount } => {
                numeric(field, value).map(|x| Value::Float64(x + amount))
            }
            TransformOp::Round { decimals } => {
                numeric(field, value).map(|x| Value::Float64(round_to(x, decimals)))
            }
            TransformOp::Uppercase => text(field, value).map(|s| Value::Utf8(s.to_uppercase())),
            TransformOp::Lowercase => text(field, value).map(|s| Value::Utf8(s.to_lowercase())),
        }
    }

    fn describe(self) -> String {
        match self {
            TransformOp::Multiply { by } => format!("* {by}"),
            TransformOp::Add { amount } => format!("+ {amount}"),
            TransformOp::Round { decimals } => format!("round({decimals})"),
            TransformOp::Uppercase => "uppercase".to_string(),
            TransformOp::Lowercase => "lowercase".to_string(),
        }
    }
}

/// Round `x` to `decimals` places. Precision beyond what `f64` can scale returns `x` unchanged.
fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    let rounded = scaled.round() / factor;
    if rounded.is_finite() { rounded } else { x }
}

fn numeric(field: &str, value: &Value) -> PipelineResult<f64> {
    value.as_f64().ok_or_else(|| PipelineError::TypeMismatch {
        field: field.to_string(),
        expected: "number",
        found: value.type_name(),
    })
}

fn text<'a>(field: &str, value: &'a Value) -> PipelineResult<&'a str> {
    value.as_str().ok_or_else(|| PipelineError::TypeMismatch {
        field: field.to_string(),
        expected: "utf8",
        found: value.type_name(),
    })
}

impl StepConfig {
    /// Build the processor this step describes.
    pub fn build(&self) -> PipelineResult<Box<dyn Processor>> {
        match self {
            StepConfig::Filter { field, equals } => {
                Ok(Box::new(FilterProcessor::new(field.clone(), equals.clone())))
            }
            StepConfig::Transform { field, ops } => {
                if ops.is_empty() {
                    return Err(PipelineError::Config {
                        message: format!("transform of '{field}' has no ops"),
                    });
                }
                let ops = ops.clone();
                let label = ops.iter().map(|op| op.describe()).collect::<Vec<_>>().join(", ");
                let err_field = field.clone();
                let t = TransformProcessor::try_new(field.clone(), move |v| {
                    let mut current = v.clone();
                    for op in &ops {
                        current = op.apply(&err_field, &current)?;
                    }
                    Ok(current)
                })
                .with_label(label);
                Ok(Box::new(t))
            }
            StepConfig::Aggregate {
                group_by,
                field,
                reduce,
            } => Ok(Box::new(
                AggregateProcessor::new(group_by.clone(), field.clone()).with_op(*reduce),
            )),
        }
    }
}

impl PipelineConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(input: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Build a [`Pipeline`] with one step per config entry, in order.
    pub fn build(&self) -> PipelineResult<Pipeline> {
        if self.steps.is_empty() {
            return Err(PipelineError::Config {
                message: "pipeline config has no steps".to_string(),
            });
        }
        let mut pipeline = Pipeline::new();
        for step in &self.steps {
            pipeline.add_boxed_step(step.build()?);
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::{PipelineConfig, StepConfig, TransformOp};
    use crate::error::PipelineError;
    use crate::processing::ReduceOp;
    use crate::record;
    use crate::types::Value;

    #[test]
    fn parses_all_step_kinds() {
        let config = PipelineConfig::from_json_str(
            r#"{"steps": [
                {"kind": "filter", "field": "status", "equals": "active"},
                {"kind": "transform", "field": "name", "ops": [{"op": "uppercase"}]},
                {"kind": "aggregate", "group_by": "region", "field": "revenue", "reduce": "max"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            config.steps,
            vec![
                StepConfig::Filter {
                    field: "status".to_string(),
                    equals: Value::from("active"),
                },
                StepConfig::Transform {
                    field: "name".to_string(),
                    ops: vec![TransformOp::Uppercase],
                },
                StepConfig::Aggregate {
                    group_by: "region".to_string(),
                    field: "revenue".to_string(),
                    reduce: ReduceOp::Max,
                },
            ]
        );
    }

    #[test]
    fn aggregate_reduce_defaults_to_sum() {
        let config = PipelineConfig::from_json_str(
            r#"{"steps": [{"kind": "aggregate", "group_by": "g", "field": "v"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.steps[0],
            StepConfig::Aggregate { reduce: ReduceOp::Sum, .. }
        ));
    }

    #[test]
    fn unknown_step_kind_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"steps": [{"kind": "sort", "field": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Json(_)));
    }

    #[test]
    fn empty_steps_fail_to_build() {
        let config = PipelineConfig::from_json_str(r#"{"steps": []}"#).unwrap();
        let err = config.build().unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn transform_ops_apply_left_to_right() {
        let step = StepConfig::Transform {
            field: "revenue".to_string(),
            ops: vec![
                TransformOp::Multiply { by: 1.1 },
                TransformOp::Round { decimals: 2 },
            ],
        };
        let processor = step.build().unwrap();
        let out = processor.process(&[record! { "revenue" => 1000.0 }]).unwrap();
        assert_eq!(out[0].get("revenue"), Some(&Value::Float64(1100.0)));
        assert_eq!(processor.name(), "transform(revenue: * 1.1, round(2))");
    }

    #[test]
    fn round_with_excess_precision_keeps_the_value() {
        let v = TransformOp::Round { decimals: 400 }.apply("n", &Value::Float64(1.5)).unwrap();
        assert_eq!(v, Value::Float64(1.5));

        let v = TransformOp::Round { decimals: 300 }.apply("n", &Value::Float64(1e10)).unwrap();
        assert_eq!(v, Value::Float64(1e10));

        let v = TransformOp::Round { decimals: u32::MAX }.apply("n", &Value::Int64(7)).unwrap();
        assert_eq!(v, Value::Float64(7.0));

        let v = TransformOp::Round { decimals: 1 }.apply("n", &Value::Float64(2.25)).unwrap();
        assert_eq!(v, Value::Float64(2.3));
    }

    #[test]
    fn string_op_on_number_is_type_mismatch() {
        let err = TransformOp::Uppercase.apply("n", &Value::Int64(1)).unwrap_err();
        assert!(matches!(err, PipelineError::TypeMismatch { expected: "utf8", .. }));
    }

    #[test]
    fn add_op_accepts_integers() {
        let v = TransformOp::Add { amount: 0.5 }.apply("n", &Value::Int64(2)).unwrap();
        assert_eq!(v, Value::Float64(2.5));
    }
}
