use chrono::NaiveDate;
use ox_type_converter::converters::{format_date, value_to_text};
use serde_json::Value;

/// UI-native value held by one form control.
///
/// The empty text value doubles as the "nothing entered" sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::empty()
    }
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Lift a JSON value into a field value without any kind-specific coercion.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::empty(),
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(
                items.iter().filter(|v| !v.is_null()).map(value_to_text).collect(),
            ),
            Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }

    /// JSON view of the value; dates are rendered as `YYYY-MM-DD`.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(format_date(*d)),
            FieldValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }

    /// Text form used by the pattern and email checks.
    pub fn as_text(&self) -> String {
        value_to_text(&self.to_json())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(str::to_string).collect())
    }
}
