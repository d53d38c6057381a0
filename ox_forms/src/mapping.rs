use std::collections::HashMap;

use crate::schema::FieldDescriptor;

/// Bridges UI field names and the backend's key names.
///
/// `record_keys` is consulted when reading an existing record; a field that is
/// not listed is read under its own name. `wire_keys` is consulted when
/// building an outbound payload; a field that is not listed is not sent.
#[derive(Debug, Clone, Default)]
pub struct FieldNameMap {
    record_keys: HashMap<String, String>,
    wire_keys: HashMap<String, String>,
}

impl FieldNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire keys are the PascalCase form of every field name.
    pub fn pascal_case(fields: &[FieldDescriptor]) -> Self {
        let mut map = Self::new();
        for field in fields {
            map.wire_keys.insert(field.name.clone(), to_pascal_case(&field.name));
        }
        map
    }

    /// Mapping used by the profile backend.
    pub fn profile(fields: &[FieldDescriptor]) -> Self {
        Self::pascal_case(fields).with_record_key("birthday", "date")
    }

    pub fn with_record_key(mut self, field: &str, key: &str) -> Self {
        self.record_keys.insert(field.to_string(), key.to_string());
        self
    }

    pub fn with_wire_key(mut self, field: &str, key: &str) -> Self {
        self.wire_keys.insert(field.to_string(), key.to_string());
        self
    }

    pub fn record_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.record_keys.get(field).map(String::as_str).unwrap_or(field)
    }

    pub fn wire_key(&self, field: &str) -> Option<&str> {
        self.wire_keys.get(field).map(String::as_str)
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn to_pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
