//! String conversion functions
//! 
//! This module contains all conversion functions that produce text.

use serde_json::Value;

/// Render any value as text. `null` becomes the empty string and arrays are
/// joined with commas.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_to_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Split a comma-separated string (or flatten an array) into trimmed tokens,
/// dropping empty tokens and the literal `null`.
pub fn value_to_tokens(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(value_to_text)
            .collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty() && token != "null")
        .collect()
}

/// Join tokens the way the wire format expects (no spaces).
pub fn tokens_to_string(tokens: &[String]) -> String {
    tokens.join(",")
}
