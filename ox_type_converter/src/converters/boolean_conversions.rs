//! Boolean conversion functions
//! 
//! This module contains all conversion functions that involve boolean types.

use serde_json::Value;

/// Truthiness of a value: `null`, `false`, `0` and `""` are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict boolean parse: `true`/`false` strings in any case, or a JSON boolean.
pub fn value_to_boolean(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("Failed to parse boolean from {:?}", s)),
        },
        other => Err(format!("Cannot convert {} to boolean", other)),
    }
}

/// Checkbox reading of a stored value: strings are true only when they say
/// `true` (any case), other values go by truthiness.
pub fn value_to_flag(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        other => is_truthy(other),
    }
}
