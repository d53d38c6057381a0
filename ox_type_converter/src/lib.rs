//! ox_type_converter - value coercions for form values
//! 
//! This crate provides the primitive conversions between loosely typed JSON
//! values (as they arrive from records or user input) and the semantic types
//! a form field carries, organized into separate modules per target type.

pub mod value_type;
pub mod converters;

pub use value_type::ValueType;
pub use converters::TypeConverter;

// Re-export commonly used types
pub use serde_json::Value;
pub use chrono::NaiveDate;
