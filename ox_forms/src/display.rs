use ox_type_converter::converters::{value_to_text, value_to_tokens};
use serde::Serialize;
use serde_json::Value;

use crate::binding::Record;
use crate::mapping::FieldNameMap;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::transform::match_option;

/// Record keys never shown in listings.
pub const CREDENTIAL_KEYS: [&str; 2] = ["password", "Password"];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// Human readable text for a stored value.
pub fn display_value(field: &FieldDescriptor, raw: &Value) -> String {
    match field.kind {
        FieldKind::Multiselect => value_to_tokens(raw)
            .iter()
            .map(|token| {
                match_option(&field.options, &Value::String(token.clone()))
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| token.clone())
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ if !field.options.is_empty() => match_option(&field.options, raw)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| value_to_text(raw)),
        _ => value_to_text(raw),
    }
}

/// One row per schema field, credential fields left out.
pub fn display_rows(fields: &[FieldDescriptor], names: &FieldNameMap, record: &Record) -> Vec<DisplayRow> {
    fields
        .iter()
        .filter(|field| field.kind != FieldKind::Password)
        .map(|field| {
            let raw = record.get(names.record_key(&field.name)).unwrap_or(&Value::Null);
            DisplayRow {
                name: field.name.clone(),
                label: field.label.clone(),
                value: display_value(field, raw),
            }
        })
        .collect()
}

pub fn strip_credentials(mut record: Record) -> Record {
    for key in CREDENTIAL_KEYS {
        record.remove(key);
    }
    record
}
