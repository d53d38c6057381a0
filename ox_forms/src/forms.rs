//! Credential forms with fixed shapes: login, registration, password update and reset.

use serde_json::json;

use crate::schema::{FieldDescriptor, FieldKind, ValidationRule};
use crate::state::{FormControl, FormState};
use crate::validation::PasswordMatch;
use crate::value::FieldValue;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

fn required(label: &str) -> ValidationRule {
    ValidationRule::new("required", &format!("{} is required", label))
}

fn min_length(label: &str, len: u64) -> ValidationRule {
    ValidationRule::new("minLength", &format!("{} must be at least {} characters long", label, len))
        .with_parameter(json!(len))
}

fn email_rule() -> ValidationRule {
    ValidationRule::new("email", "Please enter a valid email address")
}

fn confirm_password() -> FieldDescriptor {
    FieldDescriptor::new("confirmPassword", FieldKind::Password)
        .with_label("Confirm password")
        .with_validation(required("Confirm password"))
}

fn new_password() -> FieldDescriptor {
    FieldDescriptor::new("newPassword", FieldKind::Password)
        .with_label("New password")
        .with_validation(required("New password"))
        .with_validation(min_length("New password", 6))
}

fn build(fields: Vec<FieldDescriptor>) -> FormState {
    FormState::new(
        fields
            .into_iter()
            .map(|field| FormControl::new(field, FieldValue::empty()))
            .collect(),
    )
}

pub fn login_schema() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("username", FieldKind::Text)
            .with_label("Username")
            .with_validation(required("Username"))
            .with_validation(min_length("Username", 3)),
        FieldDescriptor::new("password", FieldKind::Password)
            .with_label("Password")
            .with_validation(required("Password")),
    ]
}

pub fn registration_schema() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("username", FieldKind::Text)
            .with_label("Username")
            .with_validation(required("Username"))
            .with_validation(min_length("Username", 3))
            .with_validation(
                ValidationRule::new("pattern", "Username may only contain letters, numbers and underscores")
                    .with_parameter(json!("[a-zA-Z0-9_]+")),
            ),
        FieldDescriptor::new("name", FieldKind::Text).with_label("Name"),
        FieldDescriptor::new("email", FieldKind::Email)
            .with_label("Email")
            .with_validation(required("Email"))
            .with_validation(email_rule()),
        FieldDescriptor::new("password", FieldKind::Password)
            .with_label("Password")
            .with_validation(required("Password"))
            .with_validation(min_length("Password", 6)),
        confirm_password(),
    ]
}

pub fn password_update_schema() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("currentPassword", FieldKind::Password)
            .with_label("Current password")
            .with_validation(required("Current password")),
        new_password(),
        confirm_password(),
    ]
}

pub fn password_reset_schema() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("email", FieldKind::Email)
            .with_label("Email")
            .with_validation(required("Email"))
            .with_validation(email_rule()),
        new_password(),
        confirm_password(),
    ]
}

pub fn login_form() -> FormState {
    build(login_schema())
}

pub fn registration_form() -> FormState {
    build(registration_schema()).with_rule(PasswordMatch::new("password", "confirmPassword", PASSWORD_MISMATCH))
}

pub fn password_update_form() -> FormState {
    build(password_update_schema()).with_rule(PasswordMatch::new("newPassword", "confirmPassword", PASSWORD_MISMATCH))
}

pub fn password_reset_form() -> FormState {
    build(password_reset_schema()).with_rule(PasswordMatch::new("newPassword", "confirmPassword", PASSWORD_MISMATCH))
}
