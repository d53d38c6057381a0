//! Numeric conversion functions
//! 
//! This module contains all conversion functions that produce numbers.

use serde_json::Value;

/// Parse the leading integer of a string: optional sign followed by digits,
/// ignoring leading whitespace and anything after the digits ("12px" is 12).
pub fn parse_leading_integer(value: &str) -> Result<i64, String> {
    let trimmed = value.trim_start();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        if ch.is_ascii_digit() || (idx == 0 && (ch == '-' || ch == '+')) {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end]
        .parse::<i64>()
        .map_err(|e| format!("Failed to parse integer from {:?}: {:?}", value, e))
}

/// Convert a value to an integer. Floats are truncated, strings are parsed
/// from their leading digits; booleans, null and containers are rejected.
pub fn value_to_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(|| format!("Number {} is out of integer range", n))
            }
        }
        Value::String(s) => parse_leading_integer(s),
        other => Err(format!("Cannot convert {} to integer", other)),
    }
}

/// Convert a value to a float. Strings must hold a complete number.
pub fn value_to_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("Invalid number {}", n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Failed to parse float from {:?}: {:?}", s, e)),
        other => Err(format!("Cannot convert {} to float", other)),
    }
}
