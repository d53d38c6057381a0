use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;

use crate::schema::{FieldDescriptor, ValidationRule};
use crate::state::FormState;
use crate::value::FieldValue;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email pattern is valid");
}

/// A validation rule with its parameter resolved and checked.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Min(f64),
    Max(f64),
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Email => "email",
            Constraint::MinLength(_) => "minLength",
            Constraint::MaxLength(_) => "maxLength",
            Constraint::Pattern(_) => "pattern",
            Constraint::Min(_) => "min",
            Constraint::Max(_) => "max",
        }
    }

    /// Returns true when the value satisfies the constraint.
    /// Every rule except `required` accepts an empty value.
    pub fn check(&self, value: &FieldValue) -> bool {
        if let Constraint::Required = self {
            return !value.is_empty();
        }
        if value.is_empty() {
            return true;
        }

        match self {
            Constraint::Required => true,
            Constraint::Email => EMAIL_PATTERN.is_match(&value.as_text()),
            Constraint::MinLength(min) => length_of(value).map_or(true, |len| len >= *min),
            Constraint::MaxLength(max) => length_of(value).map_or(true, |len| len <= *max),
            Constraint::Pattern(re) => re.is_match(&value.as_text()),
            Constraint::Min(min) => number_of(value).map_or(true, |n| n >= *min),
            Constraint::Max(max) => number_of(value).map_or(true, |n| n <= *max),
        }
    }
}

fn length_of(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Text(s) => Some(s.chars().count()),
        FieldValue::List(items) => Some(items.len()),
        _ => None,
    }
}

fn number_of(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub constraint: Constraint,
    pub message: String,
}

/// Translates a field's declared validations into compiled rules.
pub struct ValidatorComposer;

impl ValidatorComposer {
    /// Compiles every usable rule of a field in declaration order.
    /// Unknown rule names and malformed parametric rules are left out.
    pub fn compose(field: &FieldDescriptor) -> Vec<CompiledRule> {
        field
            .validations
            .iter()
            .filter_map(|rule| match Self::compile(rule) {
                Ok(Some(constraint)) => Some(CompiledRule {
                    constraint,
                    message: rule.message.clone(),
                }),
                Ok(None) => {
                    debug!("Ignoring unknown rule '{}' on field '{}'", rule.rule, field.name);
                    None
                }
                Err(reason) => {
                    warn!("Skipping '{}' rule on field '{}': {}", rule.rule, field.name, reason);
                    None
                }
            })
            .collect()
    }

    /// `Ok(None)` for unknown rule names, `Err` when a parameter is missing or unusable.
    pub fn compile(rule: &ValidationRule) -> Result<Option<Constraint>, String> {
        let constraint = match rule.rule.as_str() {
            "required" => Constraint::Required,
            "email" => Constraint::Email,
            "minLength" => Constraint::MinLength(length_parameter(rule)?),
            "maxLength" => Constraint::MaxLength(length_parameter(rule)?),
            "pattern" => Constraint::Pattern(pattern_parameter(rule)?),
            "min" => Constraint::Min(number_parameter(rule)?),
            "max" => Constraint::Max(number_parameter(rule)?),
            _ => return Ok(None),
        };
        Ok(Some(constraint))
    }

    pub fn is_malformed(rule: &ValidationRule) -> bool {
        Self::compile(rule).is_err()
    }
}

fn parameter(rule: &ValidationRule) -> Result<&Value, String> {
    rule.parameter
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| "missing parameter".to_string())
}

fn length_parameter(rule: &ValidationRule) -> Result<usize, String> {
    match parameter(rule)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize).ok_or_else(|| format!("invalid length {}", n)),
        Value::String(s) => s.trim().parse::<usize>().map_err(|_| format!("invalid length {:?}", s)),
        other => Err(format!("invalid length {}", other)),
    }
}

fn number_parameter(rule: &ValidationRule) -> Result<f64, String> {
    match parameter(rule)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("invalid bound {}", n)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| format!("invalid bound {:?}", s)),
        other => Err(format!("invalid bound {}", other)),
    }
}

/// Patterns must match the whole value; anchors are added when missing.
fn pattern_parameter(rule: &ValidationRule) -> Result<Regex, String> {
    let source = parameter(rule)?
        .as_str()
        .ok_or_else(|| "pattern must be a string".to_string())?;
    let mut anchored = String::new();
    if !source.starts_with('^') {
        anchored.push('^');
    }
    anchored.push_str(source);
    if !source.ends_with('$') {
        anchored.push('$');
    }
    Regex::new(&anchored).map_err(|e| format!("invalid pattern: {}", e))
}

/// Message of the first failing rule, in declaration order.
pub fn first_error<'a>(rules: &'a [CompiledRule], value: &FieldValue) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| !rule.constraint.check(value))
        .map(|rule| rule.message.as_str())
}

/// A rule spanning several fields. Its error is attached to `target()` only.
pub trait FormRule: Send + Sync {
    fn target(&self) -> &str;
    fn check(&self, form: &FormState) -> Result<(), String>;
}

/// Requires the confirmation field to equal the password field.
#[derive(Debug, Clone)]
pub struct PasswordMatch {
    pub password: String,
    pub confirmation: String,
    pub message: String,
}

impl PasswordMatch {
    pub fn new(password: &str, confirmation: &str, message: &str) -> Self {
        Self {
            password: password.to_string(),
            confirmation: confirmation.to_string(),
            message: message.to_string(),
        }
    }
}

impl FormRule for PasswordMatch {
    fn target(&self) -> &str {
        &self.confirmation
    }

    fn check(&self, form: &FormState) -> Result<(), String> {
        match (form.value(&self.password), form.value(&self.confirmation)) {
            (Some(password), Some(confirmation)) if password != confirmation => Err(self.message.clone()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use serde_json::json;

    fn rule(name: &str, parameter: Option<Value>) -> Constraint {
        let mut r = ValidationRule::new(name, "msg");
        r.parameter = parameter;
        ValidatorComposer::compile(&r).unwrap().unwrap()
    }

    #[test]
    fn test_required() {
        let required = rule("required", None);
        assert!(!required.check(&FieldValue::empty()));
        assert!(!required.check(&FieldValue::List(vec![])));
        assert!(required.check(&FieldValue::Integer(0)));
        assert!(required.check(&FieldValue::Bool(false)));
        assert!(required.check(&"x".into()));
    }

    #[test]
    fn test_email() {
        let email = rule("email", None);
        assert!(email.check(&"jane.doe@example.com".into()));
        assert!(email.check(&FieldValue::empty()));
        assert!(!email.check(&"jane.doe".into()));
        assert!(!email.check(&"jane@@example.com".into()));
    }

    #[test]
    fn test_lengths() {
        let min = rule("minLength", Some(json!(3)));
        let max = rule("maxLength", Some(json!("4")));
        assert!(!min.check(&"ab".into()));
        assert!(min.check(&"abc".into()));
        assert!(max.check(&"abcd".into()));
        assert!(!max.check(&"abcde".into()));
        assert!(!max.check(&FieldValue::from(vec!["a", "b", "c", "d", "e"])));
        assert!(min.check(&FieldValue::Integer(1)));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = rule("pattern", Some(json!("[a-z]+")));
        assert!(pattern.check(&"abc".into()));
        assert!(!pattern.check(&"abc1".into()));
        assert!(pattern.check(&FieldValue::empty()));
    }

    #[test]
    fn test_bounds() {
        let min = rule("min", Some(json!(18)));
        let max = rule("max", Some(json!(99.5)));
        assert!(!min.check(&FieldValue::Integer(17)));
        assert!(min.check(&"18".into()));
        assert!(max.check(&FieldValue::Float(99.5)));
        assert!(!max.check(&FieldValue::Integer(100)));
        assert!(min.check(&"not a number".into()));
    }

    #[test]
    fn test_compile_rejects_missing_parameters() {
        for name in ["minLength", "maxLength", "pattern", "min", "max"] {
            assert!(ValidatorComposer::is_malformed(&ValidationRule::new(name, "m")), "{}", name);
        }
        assert!(ValidatorComposer::is_malformed(
            &ValidationRule::new("minLength", "m").with_parameter(json!(-1))
        ));
        assert!(!ValidatorComposer::is_malformed(&ValidationRule::new("whatever", "m")));
    }

    #[test]
    fn test_first_error_follows_declaration_order() {
        let field = FieldDescriptor::new("username", FieldKind::Text)
            .with_validation(ValidationRule::new("minLength", "Too short").with_parameter(json!(3)))
            .with_validation(ValidationRule::new("pattern", "Letters only").with_parameter(json!("[a-z]+")))
            .with_validation(ValidationRule::new("frobnicate", "Never shown"));
        let rules = ValidatorComposer::compose(&field);

        assert_eq!(rules.len(), 2);
        assert_eq!(first_error(&rules, &"a1".into()), Some("Too short"));
        assert_eq!(first_error(&rules, &"abc1".into()), Some("Letters only"));
        assert_eq!(first_error(&rules, &"abcd".into()), None);
    }
}
