use std::collections::HashMap;

use log::debug;
use ox_type_converter::converters::{parse_date, value_to_boolean, value_to_tokens};
use serde_json::{Map, Value};

use crate::error::{FormError, ValidationError};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::validation::{first_error, CompiledRule, FormRule, ValidatorComposer};
use crate::value::FieldValue;

/// One bound control: descriptor, current value and its compiled rules.
pub struct FormControl {
    pub descriptor: FieldDescriptor,
    value: FieldValue,
    initial: FieldValue,
    rules: Vec<CompiledRule>,
    touched: bool,
}

impl FormControl {
    pub fn new(descriptor: FieldDescriptor, value: FieldValue) -> Self {
        let rules = ValidatorComposer::compose(&descriptor);
        Self {
            descriptor,
            initial: value.clone(),
            value,
            rules,
            touched: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }
}

/// Ticket handed out when a request starts; see [`FormState::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Live values of a form plus their derived validity.
///
/// Errors are never stored: every query recomputes them from the descriptors,
/// the current values and the form-level rules.
pub struct FormState {
    controls: Vec<FormControl>,
    index: HashMap<String, usize>,
    form_rules: Vec<Box<dyn FormRule>>,
    generation: u64,
}

impl FormState {
    pub fn new(controls: Vec<FormControl>) -> Self {
        let index = controls
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name().to_string(), idx))
            .collect();
        Self {
            controls,
            index,
            form_rules: Vec::new(),
            generation: 0,
        }
    }

    pub fn with_rule(mut self, rule: impl FormRule + 'static) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn add_rule(&mut self, rule: impl FormRule + 'static) {
        self.form_rules.push(Box::new(rule));
    }

    pub fn controls(&self) -> &[FormControl] {
        &self.controls
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.controls.iter().map(FormControl::name).collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.control(name).map(|c| &c.descriptor)
    }

    fn control(&self, name: &str) -> Option<&FormControl> {
        self.index.get(name).map(|idx| &self.controls[*idx])
    }

    fn control_mut(&mut self, name: &str) -> Result<&mut FormControl, FormError> {
        match self.index.get(name) {
            Some(idx) => Ok(&mut self.controls[*idx]),
            None => Err(FormError::UnknownField(name.to_string())),
        }
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.control(name).map(|c| &c.value)
    }

    /// Any edit invalidates outstanding tickets.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let control = self.control_mut(name)?;
        control.value = value.into();
        self.generation += 1;
        Ok(())
    }

    /// Set a field from raw user input, parsed according to the field kind.
    pub fn set_input(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let kind = self
            .descriptor(name)
            .map(|d| d.kind)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let text = Value::String(raw.to_string());

        let value = match kind {
            FieldKind::Checkbox => FieldValue::Bool(value_to_boolean(&text).unwrap_or(!raw.trim().is_empty())),
            FieldKind::Multiselect => FieldValue::List(value_to_tokens(&text)),
            FieldKind::Date => parse_date(raw).map(FieldValue::Date).unwrap_or_else(|| raw.into()),
            FieldKind::Number => match raw.trim().parse::<i64>() {
                Ok(i) => FieldValue::Integer(i),
                Err(_) => raw.into(),
            },
            _ => raw.into(),
        };
        self.set_value(name, value)
    }

    /// Bulk update; keys that are not fields of this form are ignored.
    pub fn patch(&mut self, values: &Map<String, Value>) {
        for (key, value) in values {
            match self.control_mut(key) {
                Ok(control) => control.value = FieldValue::from_json(value),
                Err(_) => debug!("Ignoring patch for unknown field '{}'", key),
            }
        }
        self.generation += 1;
    }

    /// JSON snapshot of the UI values, keyed by field name.
    pub fn values(&self) -> Map<String, Value> {
        self.controls
            .iter()
            .map(|c| (c.name().to_string(), c.value.to_json()))
            .collect()
    }

    /// Current error message for a field: its own first failing rule, then
    /// any failing form-level rule that targets it.
    pub fn error(&self, name: &str) -> Option<String> {
        let control = self.control(name)?;
        if let Some(message) = first_error(&control.rules, &control.value) {
            return Some(message.to_string());
        }
        self.form_rules
            .iter()
            .filter(|rule| rule.target() == name)
            .find_map(|rule| rule.check(self).err())
    }

    /// Error shown to the user: only once the field has been touched.
    pub fn visible_error(&self, name: &str) -> Option<String> {
        if self.is_touched(name) {
            self.error(name)
        } else {
            None
        }
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.controls
            .iter()
            .filter_map(|c| {
                self.error(c.name()).map(|message| ValidationError {
                    field: c.name().to_string(),
                    message,
                })
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.controls.iter().all(|c| self.error(c.name()).is_none())
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.control(name).map(|c| c.touched).unwrap_or(false)
    }

    pub fn mark_touched(&mut self, name: &str) -> Result<(), FormError> {
        self.control_mut(name)?.touched = true;
        Ok(())
    }

    pub fn mark_all_as_touched(&mut self) {
        for control in &mut self.controls {
            control.touched = true;
        }
    }

    /// Submission gate: an invalid form is never sent. All fields are marked
    /// touched and every field error is returned.
    pub fn submit(&mut self) -> Result<(), FormError> {
        if self.is_valid() {
            return Ok(());
        }
        self.mark_all_as_touched();
        Err(FormError::Invalid(self.errors()))
    }

    /// Back to the values the form was built with. Outstanding tickets are invalidated.
    pub fn reset(&mut self) {
        for control in &mut self.controls {
            control.value = control.initial.clone();
            control.touched = false;
        }
        self.generation += 1;
    }

    /// Start a request for this form. Any earlier ticket stops being current.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket(self.generation)
    }

    /// Whether a request's result may still be applied.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.generation
    }
}
