//! Searchable field values.
//!
//! Field scans compare one JSON field of every record against a caller-supplied
//! value. Only integers and strings are comparable; anything else is carried
//! as [`FieldValue::Unsupported`] and never matches.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Str(String),
    Unsupported,
}

impl FieldValue {
    /// Exact-kind equality against a decoded JSON field.
    ///
    /// An integer only matches a JSON integer (never a float such as `3.0`),
    /// a string only matches a JSON string.
    pub fn matches(&self, field: &Value) -> bool {
        match (self, field) {
            (FieldValue::Int(want), Value::Number(n)) => n.as_i64() == Some(*want),
            (FieldValue::Str(want), Value::String(s)) => want == s,
            _ => false,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Str(v.clone())
    }
}

impl From<&Value> for FieldValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Number(n) => n.as_i64().map_or(FieldValue::Unsupported, FieldValue::Int),
            Value::String(s) => FieldValue::Str(s.clone()),
            _ => FieldValue::Unsupported,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::from(&v)
    }
}
