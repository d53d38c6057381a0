use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use log::trace;
use ox_type_converter::converters::{format_date, tokens_to_string, value_to_date, value_to_text};
use ox_type_converter::TypeConverter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mapping::FieldNameMap;
use crate::schema::{FieldDescriptor, FieldKind, OptionItem};
use crate::state::FormState;

/// Which side of a matched option goes on the wire.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionPolicy {
    #[default]
    Label,
    Value,
}

impl OptionPolicy {
    fn emit(&self, option: &OptionItem) -> Value {
        match self {
            OptionPolicy::Label => Value::String(option.label.clone()),
            OptionPolicy::Value => option.value.clone(),
        }
    }
}

/// Converts UI values into the backend's flat payload.
#[derive(Debug, Clone)]
pub struct WireTransformer {
    names: FieldNameMap,
    policy: OptionPolicy,
    excluded: HashSet<String>,
    today: Option<NaiveDate>,
}

impl WireTransformer {
    pub fn new(names: FieldNameMap, policy: OptionPolicy) -> Self {
        Self {
            names,
            policy,
            excluded: HashSet::new(),
            today: None,
        }
    }

    /// Drops a wire key from every payload this transformer builds.
    pub fn excluding(mut self, wire_key: &str) -> Self {
        self.excluded.insert(wire_key.to_string());
        self
    }

    /// Pins the date used for empty or invalid date fields.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn policy(&self) -> OptionPolicy {
        self.policy
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Payload for the given UI values, keyed by wire name.
    pub fn transform(&self, fields: &[FieldDescriptor], values: &Map<String, Value>) -> Map<String, Value> {
        let mut payload = Map::new();
        for field in fields {
            let Some(key) = self.names.wire_key(&field.name) else {
                continue;
            };
            if self.excluded.contains(key) {
                continue;
            }
            let raw = values.get(&field.name).unwrap_or(&Value::Null);
            payload.insert(key.to_string(), self.field_to_wire(field, raw));
        }
        trace!("Wire payload: {}", Value::Object(payload.clone()));
        payload
    }

    pub fn transform_form(&self, form: &FormState) -> Map<String, Value> {
        let fields: Vec<FieldDescriptor> = form.controls().iter().map(|c| c.descriptor.clone()).collect();
        self.transform(&fields, &form.values())
    }

    /// Update payload: the regular payload plus the record identifier as `Id`.
    pub fn transform_update(&self, id: &Value, form: &FormState) -> Map<String, Value> {
        let mut payload = self.transform_form(form);
        payload.insert("Id".to_string(), id.clone());
        payload
    }

    pub fn field_to_wire(&self, field: &FieldDescriptor, raw: &Value) -> Value {
        match field.kind {
            FieldKind::Date => Value::String(format_date(value_to_date(raw).unwrap_or_else(|| self.today()))),
            FieldKind::Radio | FieldKind::Select => self.resolve_option(field, raw),
            FieldKind::Multiselect => Value::String(self.join_selection(field, raw)),
            kind => match kind.value_type() {
                Some(target) => TypeConverter::coerce(raw, target),
                None => raw.clone(),
            },
        }
    }

    /// Matched option under the policy, else the first option.
    pub fn resolve_option(&self, field: &FieldDescriptor, raw: &Value) -> Value {
        if let Some(option) = match_option(&field.options, raw) {
            return self.policy.emit(option);
        }
        match field.options.first() {
            Some(first) => self.policy.emit(first),
            None => Value::String(value_to_text(raw)),
        }
    }

    fn join_selection(&self, field: &FieldDescriptor, raw: &Value) -> String {
        match raw {
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let tokens: Vec<String> = items
                    .iter()
                    .map(|item| match match_option(&field.options, item) {
                        Some(option) => value_to_text(&self.policy.emit(option)),
                        None => value_to_text(item),
                    })
                    .collect();
                tokens_to_string(&tokens)
            }
            Value::Null => String::new(),
            other => value_to_text(other),
        }
    }
}

/// Option whose value equals `raw` (directly or as text), else whose label
/// equals it ignoring case.
pub fn match_option<'a>(options: &'a [OptionItem], raw: &Value) -> Option<&'a OptionItem> {
    options
        .iter()
        .find(|o| TypeConverter::loosely_equal(&o.value, raw))
        .or_else(|| {
            let text = raw.as_str()?;
            options.iter().find(|o| o.label.to_lowercase() == text.to_lowercase())
        })
}
