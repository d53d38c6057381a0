use thiserror::Error;

/// Represents a validation error for a specific field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to load form schema: {0}")]
    SchemaLoad(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("form is invalid: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    /// Field errors carried by an `Invalid` error, empty otherwise.
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            FormError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}
