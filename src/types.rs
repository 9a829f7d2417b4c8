//! Core data model types.
//!
//! Pipelines operate on sequences of [`Record`]s. A record is an ordered mapping from field name
//! to a typed [`Value`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PipelineError, PipelineResult};

/// A single typed value in a [`Record`].
///
/// Serializes as the plain JSON scalar (`null`, a number, a bool or a string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Utf8(_) => "utf8",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Only `Int64` and `Float64` are numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of the value, if it is `Utf8`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Equality that treats `Int64(n)` and a `Float64` holding exactly `n` as equal.
    ///
    /// The comparison is exact: `Int64(2^53 + 1)` does not equal `Float64(2^53)`. All other
    /// combinations fall back to structural equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int64(a), Value::Float64(b)) | (Value::Float64(b), Value::Int64(a)) => {
                exact_int(*b) == Some(*a)
            }
            _ => self == other,
        }
    }

    /// Hashable key with the same equivalence as [`Value::loose_eq`] (NaN excepted).
    pub(crate) fn group_key(&self) -> GroupKey {
        match self {
            Value::Null => GroupKey::Null,
            Value::Int64(v) => GroupKey::Int(*v),
            Value::Float64(v) => match exact_int(*v) {
                Some(i) => GroupKey::Int(i),
                None => GroupKey::Float(v.to_bits()),
            },
            Value::Bool(v) => GroupKey::Bool(*v),
            Value::Utf8(s) => GroupKey::Str(s.clone()),
        }
    }
}

/// The integer `v` holds exactly, if any.
fn exact_int(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
}

/// One row of tabular data: an ordered mapping from field name to [`Value`].
///
/// Field names are unique. Inserting an existing field replaces its value in place, so field
/// order is always the order of first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Returns the value of `field`, or [`PipelineError::MissingField`].
    pub fn require(&self, field: &str) -> PipelineResult<&Value> {
        self.get(field)
            .ok_or_else(|| PipelineError::missing_field(field))
    }

    /// Returns `true` if the record has `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set `field` to `value`, returning the previous value if the field existed.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter().position(|(name, _)| *name == field) {
            Some(idx) => Some(std::mem::replace(&mut self.fields[idx].1, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of scalar fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        // Preserve the source field order; serde_json's own map type would sort keys.
        let mut record = Record::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry::<String, Value>()? {
            record.insert(k, v);
        }
        Ok(record)
    }
}

/// Build a [`Record`] from `field => value` pairs.
///
/// ```rust
/// use record_pipeline::record;
/// use record_pipeline::types::Value;
///
/// let r = record! { "id" => 1, "status" => "active", "revenue" => 1000.0 };
/// assert_eq!(r.get("status"), Some(&Value::Utf8("active".to_string())));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::types::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {
        $crate::types::Record::new()$(.with($field, $value))+
    };
}

#[cfg(test)]
mod tests {
    use super::{Record, Value};

    #[test]
    fn insert_replaces_in_place_and_keeps_order() {
        let mut r = record! { "a" => 1, "b" => 2, "c" => 3 };
        let prev = r.insert("b", 20);

        assert_eq!(prev, Some(Value::Int64(2)));
        assert_eq!(r.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(r.get("b"), Some(&Value::Int64(20)));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn require_reports_missing_field() {
        let r = record! { "a" => 1 };
        let err = r.require("missing").unwrap_err();
        assert_eq!(err.to_string(), "missing field 'missing'");
    }

    #[test]
    fn loose_eq_crosses_int_and_float() {
        assert!(Value::Int64(1000).loose_eq(&Value::Float64(1000.0)));
        assert!(Value::Float64(2.0).loose_eq(&Value::Int64(2)));
        assert!(!Value::Int64(1).loose_eq(&Value::Float64(1.5)));
        assert!(!Value::Utf8("1".to_string()).loose_eq(&Value::Int64(1)));
        assert!(Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn group_key_matches_loose_eq_for_integral_floats() {
        assert_eq!(Value::Int64(3).group_key(), Value::Float64(3.0).group_key());
        assert_ne!(Value::Float64(3.5).group_key(), Value::Int64(3).group_key());
    }

    #[test]
    fn loose_eq_is_exact_beyond_f64_precision() {
        let big = (1_i64 << 53) + 1;
        let rounded = (1_i64 << 53) as f64;
        assert!(!Value::Int64(big).loose_eq(&Value::Float64(rounded)));
        assert!(!Value::Float64(rounded).loose_eq(&Value::Int64(big)));
        assert!(Value::Int64(1 << 53).loose_eq(&Value::Float64(rounded)));
        assert_ne!(Value::Int64(big).group_key(), Value::Float64(rounded).group_key());
        assert!(!Value::Int64(i64::MAX).loose_eq(&Value::Float64(i64::MAX as f64)));
    }

    #[test]
    fn null_and_field_presence() {
        let r = record! { "a" => Value::Null, "b" => 1 };
        assert!(r.get("a").is_some_and(Value::is_null));
        assert!(!r.get("b").is_some_and(Value::is_null));
        assert!(r.contains("a"));
        assert!(!r.contains("c"));
    }

    #[test]
    fn display_quotes_strings_only() {
        assert_eq!(Value::from("active").to_string(), "\"active\"");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn serde_json_preserves_field_order() {
        let r: Record = serde_json::from_str(r#"{"z": 1, "a": "x", "m": null, "f": 2.5}"#).unwrap();
        assert_eq!(r.field_names().collect::<Vec<_>>(), vec!["z", "a", "m", "f"]);
        assert_eq!(r.get("z"), Some(&Value::Int64(1)));
        assert_eq!(r.get("m"), Some(&Value::Null));
        assert_eq!(r.get("f"), Some(&Value::Float64(2.5)));

        let out = serde_json::to_string(&r).unwrap();
        assert_eq!(out, r#"{"z":1,"a":"x","m":null,"f":2.5}"#);
    }

    #[test]
    fn serde_json_rejects_nested_values() {
        let err = serde_json::from_str::<Record>(r#"{"a": {"b": 1}}"#).unwrap_err();
        assert!(err.is_data());
    }
}
