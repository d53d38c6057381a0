use std::collections::HashSet;

use log::warn;
use ox_type_converter::ValueType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;
use crate::validation::ValidatorComposer;

/// Input kind of a field. Drives both rendering and value transformation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Textarea,
    Number,
    Date,
    Radio,
    Select,
    Multiselect,
    Checkbox,
    #[serde(other)]
    Unknown,
}

impl FieldKind {
    /// Kinds whose values are picked from `options`
    pub fn has_options(&self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Select | FieldKind::Multiselect)
    }

    /// Semantic type of the wire value for kinds that are not resolved against options.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            FieldKind::Text | FieldKind::Email | FieldKind::Password | FieldKind::Textarea => Some(ValueType::String),
            FieldKind::Number => Some(ValueType::Integer),
            FieldKind::Date => Some(ValueType::Date),
            FieldKind::Checkbox => Some(ValueType::Boolean),
            FieldKind::Multiselect => Some(ValueType::List),
            FieldKind::Radio | FieldKind::Select | FieldKind::Unknown => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptionItem {
    pub label: String,
    pub value: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationRule {
    /// Rule name: "required", "email", "minLength", "maxLength", "pattern", "min", "max"
    #[serde(rename = "validator", alias = "rule")]
    pub rule: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "value", alias = "parameter", default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
}

impl ValidationRule {
    pub fn new(rule: &str, message: &str) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.to_string(),
            parameter: None,
        }
    }

    pub fn with_parameter(mut self, parameter: Value) -> Self {
        self.parameter = Some(parameter);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: name.to_string(),
            default_value: None,
            options: Vec::new(),
            validations: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_option(mut self, label: &str, value: Value) -> Self {
        self.options.push(OptionItem { label: label.to_string(), value });
        self
    }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    /// Default value with JSON `null` treated as absent.
    pub fn default_or_none(&self) -> Option<&Value> {
        self.default_value.as_ref().filter(|v| !v.is_null())
    }

    pub fn option_by_value(&self, value: &Value) -> Option<&OptionItem> {
        self.options.iter().find(|o| &o.value == value)
    }
}

/// Checks the schema invariants and drops malformed validation entries.
///
/// Field names must be unique, choice kinds must carry options and option
/// values must be unique within a field. A validation entry whose rule needs a
/// parameter but lacks a usable one is removed with a warning.
pub fn normalize_schema(mut fields: Vec<FieldDescriptor>) -> Result<Vec<FieldDescriptor>, FormError> {
    let mut names = HashSet::new();

    for field in &mut fields {
        if field.name.trim().is_empty() {
            return Err(FormError::SchemaLoad("field with an empty name".to_string()));
        }
        if !names.insert(field.name.clone()) {
            return Err(FormError::SchemaLoad(format!("duplicate field name '{}'", field.name)));
        }
        if field.kind.has_options() && field.options.is_empty() {
            return Err(FormError::SchemaLoad(format!(
                "field '{}' of kind {:?} has no options",
                field.name, field.kind
            )));
        }
        for (idx, option) in field.options.iter().enumerate() {
            if field.options[..idx].iter().any(|o| o.value == option.value) {
                return Err(FormError::SchemaLoad(format!(
                    "field '{}' repeats option value {}",
                    field.name, option.value
                )));
            }
        }

        let field_name = field.name.clone();
        field.validations.retain(|rule| {
            if ValidatorComposer::is_malformed(rule) {
                warn!("Dropping malformed '{}' validation on field '{}'", rule.rule, field_name);
                false
            } else {
                true
            }
        });
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_deserializes_schema_file_shape() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "type": "select",
            "label": "Country",
            "name": "country",
            "value": 1,
            "options": [{ "label": "India", "value": 1 }, { "label": "USA", "value": 2 }],
            "validations": [{ "name": "country", "validator": "required", "message": "Pick one" }]
        }))
        .unwrap();

        assert_eq!(field.kind, FieldKind::Select);
        assert_eq!(field.default_value, Some(json!(1)));
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.validations[0].rule, "required");
        assert_eq!(field.validations[0].parameter, None);
    }

    #[test]
    fn test_unknown_kind_is_kept() {
        let field: FieldDescriptor = serde_json::from_value(json!({ "type": "slider", "name": "volume" })).unwrap();
        assert_eq!(field.kind, FieldKind::Unknown);
        assert_eq!(field.label, "");
    }

    #[test]
    fn test_normalize_drops_malformed_rules() {
        let field = FieldDescriptor::new("bio", FieldKind::Textarea)
            .with_validation(ValidationRule::new("maxLength", "Too long"))
            .with_validation(ValidationRule::new("pattern", "Bad").with_parameter(json!("([")))
            .with_validation(ValidationRule::new("required", "Required"))
            .with_validation(ValidationRule::new("shout", "Unknown rules stay"));

        let fields = normalize_schema(vec![field]).unwrap();
        let rules: Vec<_> = fields[0].validations.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(rules, vec!["required", "shout"]);
    }

    #[test]
    fn test_normalize_rejects_choice_without_options() {
        let result = normalize_schema(vec![FieldDescriptor::new("gender", FieldKind::Radio)]);
        assert!(matches!(result, Err(FormError::SchemaLoad(_))));
    }

    #[test]
    fn test_normalize_rejects_duplicates() {
        let dup_names = normalize_schema(vec![
            FieldDescriptor::new("name", FieldKind::Text),
            FieldDescriptor::new("name", FieldKind::Email),
        ]);
        assert!(dup_names.is_err());

        let dup_values = normalize_schema(vec![FieldDescriptor::new("tier", FieldKind::Select)
            .with_option("Gold", json!(1))
            .with_option("Silver", json!(1))]);
        assert!(dup_values.is_err());
    }
}
