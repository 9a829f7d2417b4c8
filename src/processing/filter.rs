//! Record filtering by field equality.

use crate::error::PipelineResult;
use crate::types::{Record, Value};

use super::Processor;

/// Keeps records whose `field` equals `expected`, preserving input order.
///
/// Equality is [`Value::loose_eq`], so `Int64(1)` matches `Float64(1.0)`. A record without
/// `field` is an error rather than a non-match.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterProcessor {
    field: String,
    expected: Value,
}

impl FilterProcessor {
    /// Create a filter keeping records where `record[field] == expected`.
    pub fn new(field: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Field being compared.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Value records must carry to be kept.
    pub fn expected(&self) -> &Value {
        &self.expected
    }
}

impl Processor for FilterProcessor {
    fn name(&self) -> String {
        format!("filter({} == {})", self.field, self.expected)
    }

    fn process(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        let mut out = Vec::new();
        for record in records {
            if record.require(&self.field)?.loose_eq(&self.expected) {
                out.push(record.clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::FilterProcessor;
    use crate::error::PipelineError;
    use crate::processing::Processor;
    use crate::record;
    use crate::types::{Record, Value};

    fn sample_records() -> Vec<Record> {
        vec![
            record! { "id" => 1, "status" => "active", "score" => 10.0 },
            record! { "id" => 2, "status" => "inactive", "score" => 20.0 },
            record! { "id" => 3, "status" => "active", "score" => 30.0 },
        ]
    }

    #[test]
    fn keeps_matching_records_in_order() {
        let records = sample_records();
        let out = FilterProcessor::new("status", "active").process(&records).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], records[0]);
        assert_eq!(out[1], records[2]);
        assert!(out
            .iter()
            .all(|r| r.get("status") == Some(&Value::from("active"))));
        // Original unchanged
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn removes_non_matching_records() {
        let out = FilterProcessor::new("status", "inactive")
            .process(&sample_records())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("id"), Some(&Value::Int64(2)));
    }

    #[test]
    fn compares_numbers_loosely() {
        let out = FilterProcessor::new("score", 20)
            .process(&sample_records())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("id"), Some(&Value::Int64(2)));
    }

    #[test]
    fn large_integers_only_match_exact_floats() {
        let big = (1_i64 << 53) + 1;
        let records = vec![
            record! { "k" => big, "id" => 1 },
            record! { "k" => (1_i64 << 53) as f64, "id" => 2 },
        ];
        let out = FilterProcessor::new("k", big).process(&records).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("id"), Some(&Value::Int64(1)));
    }

    #[test]
    fn can_return_empty_output() {
        let out = FilterProcessor::new("status", "archived")
            .process(&sample_records())
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_field_is_an_error() {
        let records = vec![record! { "id" => 1 }];
        let err = FilterProcessor::new("status", "active")
            .process(&records)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingField { ref field } if field == "status"));
    }

    #[test]
    fn name_embeds_field_and_value() {
        let f = FilterProcessor::new("status", "active");
        assert_eq!(f.field(), "status");
        assert_eq!(f.expected(), &Value::from("active"));

        let name = f.name();
        assert!(name.contains("status"));
        assert!(name.contains("active"));
    }

    #[test]
    fn validate_input_rejects_empty_sequence() {
        let f = FilterProcessor::new("status", "active");
        let err = f.validate_input(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert!(f.apply(&[]).is_err());
        assert!(f.validate_input(&sample_records()).is_ok());
    }
}
