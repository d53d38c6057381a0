use std::fmt;

use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Semantic type of a value held by a form control or sent over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    List,
    Null,
}

impl ValueType {
    /// Infer the value type of a JSON value.
    ///
    /// Strings are inspected: numeric, boolean and ISO date contents are reported
    /// as their parsed type, anything else as `String`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Integer,
            Value::Number(_) => ValueType::Float,
            Value::String(s) => Self::infer_from_string(s),
            Value::Array(_) => ValueType::List,
            Value::Object(_) => ValueType::String,
        }
    }

    fn infer_from_string(value: &str) -> Self {
        if value.parse::<i64>().is_ok() {
            ValueType::Integer
        } else if value.parse::<f64>().is_ok() {
            ValueType::Float
        } else if value.parse::<bool>().is_ok() {
            ValueType::Boolean
        } else if crate::converters::parse_date(value).is_some() {
            ValueType::Date
        } else {
            ValueType::String
        }
    }

    /// Get the type name as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::List => "list",
            ValueType::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_of_scalars() {
        assert_eq!(ValueType::of(&json!(null)), ValueType::Null);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(42)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(3.5)), ValueType::Float);
        assert_eq!(ValueType::of(&json!(["a"])), ValueType::List);
    }

    #[test]
    fn test_value_type_from_string_contents() {
        assert_eq!(ValueType::of(&json!("12")), ValueType::Integer);
        assert_eq!(ValueType::of(&json!("1.5")), ValueType::Float);
        assert_eq!(ValueType::of(&json!("false")), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!("1990-04-12")), ValueType::Date);
        assert_eq!(ValueType::of(&json!("hello")), ValueType::String);
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Boolean.to_string(), "boolean");
        assert_eq!(ValueType::List.to_string(), "list");
    }
}
