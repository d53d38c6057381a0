//! Type conversion modules
//! 
//! Each target type keeps its conversion routines in its own file; this
//! module re-exports them and exposes the `TypeConverter` facade.

pub mod string_conversions;
pub mod numeric_conversions;
pub mod boolean_conversions;
pub mod date_conversions;

pub use string_conversions::*;
pub use numeric_conversions::*;
pub use boolean_conversions::*;
pub use date_conversions::*;

use serde_json::Value;

use crate::value_type::ValueType;

/// Main type converter that provides access to all conversion functions
pub struct TypeConverter;

impl TypeConverter {
    /// Coerce a value into the JSON representation of the target type.
    ///
    /// Conversions never fail: values that cannot be represented fall back to
    /// the type's neutral value (`""`, `0`, `false`, `[]`), except dates which
    /// become `null` so the caller can pick its own default.
    pub fn coerce(value: &Value, target_type: ValueType) -> Value {
        match target_type {
            ValueType::String => Value::String(value_to_text(value)),
            ValueType::Integer => Value::from(value_to_integer(value).unwrap_or(0)),
            ValueType::Float => Value::from(value_to_number(value).unwrap_or(0.0)),
            ValueType::Boolean => Value::Bool(is_truthy(value)),
            ValueType::Date => value_to_date(value)
                .map(|d| Value::String(format_date(d)))
                .unwrap_or(Value::Null),
            ValueType::List => Value::Array(value_to_tokens(value).into_iter().map(Value::String).collect()),
            ValueType::Null => Value::Null,
        }
    }

    /// Check if a value can be converted to the target type without falling back
    pub fn can_convert_to(value: &Value, target_type: ValueType) -> bool {
        if ValueType::of(value) == target_type {
            return true;
        }

        match target_type {
            ValueType::String => true, // Everything can be a string
            ValueType::Integer => value_to_integer(value).is_ok(),
            ValueType::Float => value_to_number(value).is_ok(),
            ValueType::Boolean => value_to_boolean(value).is_ok(),
            ValueType::Date => value_to_date(value).is_some(),
            ValueType::List => matches!(value, Value::String(_) | Value::Array(_)),
            ValueType::Null => value.is_null(),
        }
    }

    /// Equality the way option lists compare values: identical JSON, or identical text form.
    pub fn loosely_equal(left: &Value, right: &Value) -> bool {
        if left == right {
            return true;
        }
        if left.is_null() || right.is_null() {
            return false;
        }
        value_to_text(left) == value_to_text(right)
    }
}
