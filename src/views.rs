use std::sync::Arc;

use log::{info, warn};
use ox_forms::display::{display_rows, strip_credentials, DisplayRow};
use ox_forms::forms::{login_form, password_reset_form, password_update_form, registration_form};
use ox_forms::{
    FieldDescriptor, FieldKind, FileSchemaSource, FormError, FormState, FormSynthesizer, SchemaRegistry,
    StaticSchemaSource, WireTransformer,
};
use ox_profile_api::routes::resolve;
use ox_profile_api::{
    resolve_user_id, ApiError, FileStore, LoginRequest, PasswordChange, PasswordReset, ProfileClient,
    RegisterRequest, Route, SessionManager,
};
use serde_json::json;
use thiserror::Error;

use crate::config::ProfileConfig;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ViewError {
    pub fn user_message(&self) -> String {
        match self {
            ViewError::Api(e) => e.user_message(),
            ViewError::Form(e) => e.to_string(),
        }
    }
}

/// What a screen reports back once its flow has run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewOutcome {
    pub message: String,
    pub navigate: Option<Route>,
    pub rows: Vec<DisplayRow>,
}

impl ViewOutcome {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn navigate(mut self, route: Route) -> Self {
        self.navigate = Some(route);
        self
    }

    pub fn with_rows(mut self, rows: Vec<DisplayRow>) -> Self {
        self.rows = rows;
        self
    }
}

/// Everything a screen needs: configuration, the shared session, the backend client and the schema.
pub struct App {
    pub config: ProfileConfig,
    pub session: Arc<SessionManager>,
    pub client: ProfileClient,
    pub registry: SchemaRegistry,
}

impl App {
    pub fn new(config: ProfileConfig) -> Result<Self, ViewError> {
        let store = FileStore::open(&config.session_path)?;
        Self::with_session(config, Arc::new(SessionManager::new(store)))
    }

    pub fn with_session(config: ProfileConfig, session: Arc<SessionManager>) -> Result<Self, ViewError> {
        let registry = match &config.schema_path {
            Some(path) => SchemaRegistry::new(FileSchemaSource::new(path)),
            None => SchemaRegistry::new(StaticSchemaSource::profile()?),
        };
        let client = ProfileClient::new(&config.api.base_url, session.clone());
        Ok(Self {
            config,
            session,
            client,
            registry,
        })
    }

    /// `Some(redirect)` when the guards turn the route away.
    fn guard(&self, route: Route) -> Option<ViewOutcome> {
        let destination = resolve(route.clone(), &self.session);
        if destination == route {
            return None;
        }
        let message = if destination == Route::Login {
            "Please log in to continue.".to_string()
        } else {
            match self.session.username() {
                Some(name) => format!("Already logged in as {}.", name),
                None => "Already logged in.".to_string(),
            }
        };
        Some(ViewOutcome::message(message).navigate(destination))
    }

    async fn synthesizer(&self) -> Result<FormSynthesizer, ViewError> {
        Ok(FormSynthesizer::profile(self.registry.fields().await?))
    }

    fn transformer(&self, synthesizer: &FormSynthesizer) -> WireTransformer {
        WireTransformer::new(synthesizer.names().clone(), self.config.option_policy)
    }
}

/// Applies `field=value` edits as user input.
pub fn apply_edits(form: &mut FormState, edits: &[(String, String)]) -> Result<(), FormError> {
    for (name, raw) in edits {
        form.set_input(name, raw)?;
        form.mark_touched(name)?;
    }
    Ok(())
}

pub async fn login(app: &App, username: &str, password: &str) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Login) {
        return Ok(redirect);
    }
    let mut form = login_form();
    form.set_value("username", username)?;
    form.set_value("password", password)?;
    form.submit()?;

    let response = app
        .client
        .login(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
    Ok(ViewOutcome::message(format!("Welcome, {}!", response.username)).navigate(Route::Home))
}

pub struct Registration {
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn register(app: &App, registration: &Registration) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Register) {
        return Ok(redirect);
    }
    let mut form = registration_form();
    form.set_value("username", registration.username.as_str())?;
    form.set_value("name", registration.name.clone().unwrap_or_default())?;
    form.set_value("email", registration.email.as_str())?;
    form.set_value("password", registration.password.as_str())?;
    form.set_value("confirmPassword", registration.confirm_password.as_str())?;
    form.submit()?;

    let request = RegisterRequest {
        username: registration.username.clone(),
        email: registration.email.clone(),
        password: registration.password.clone(),
        name: registration.name.clone().filter(|n| !n.is_empty()),
    };
    app.client.register_and_login(&request).await?;

    if app.session.is_authenticated() {
        Ok(ViewOutcome::message("Registration successful!").navigate(Route::Home))
    } else {
        Ok(ViewOutcome::message("Registration successful! Please login to continue.").navigate(Route::Login))
    }
}

pub fn logout(app: &App) -> Result<ViewOutcome, ViewError> {
    app.session.clear()?;
    Ok(ViewOutcome::message("Logged out.").navigate(Route::Login))
}

/// Saved profile of the logged-in user.
pub async fn dashboard(app: &App) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Home) {
        return Ok(redirect);
    }
    let fields = app.registry.fields().await?;
    let user_id = resolve_user_id(&app.session, &app.config.retry_policy()).await?;
    let record = app.client.get_record_by_user(user_id).await?;
    let synthesizer = FormSynthesizer::profile(fields.clone());

    let rows = display_rows(&fields, synthesizer.names(), &record);
    let title = match app.session.username() {
        Some(name) => format!("Profile of {}", name),
        None => format!("Profile of user {}", user_id),
    };
    Ok(ViewOutcome::message(title).with_rows(rows))
}

/// Every saved record, credentials hidden.
pub async fn records(app: &App) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Records) {
        return Ok(redirect);
    }
    let synthesizer = app.synthesizer().await?;
    let records = app.client.list_records().await?;
    let mut rows = Vec::new();
    for record in records.into_iter().map(strip_credentials) {
        let id = record.get("id").map(|v| v.to_string()).unwrap_or_default();
        rows.push(DisplayRow {
            name: "id".to_string(),
            label: "Record".to_string(),
            value: id,
        });
        rows.extend(display_rows(synthesizer.fields(), synthesizer.names(), &record));
    }
    Ok(ViewOutcome::message(format!("{} records", rows.iter().filter(|r| r.name == "id").count())).with_rows(rows))
}

/// Edit form for a record: credentials are not part of it and are never sent.
pub async fn edit(app: &App, id: i64, edits: &[(String, String)]) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Edit(id)) {
        return Ok(redirect);
    }
    let fields = app.registry.fields().await?;
    let editable: Vec<FieldDescriptor> = fields.iter().filter(|f| f.kind != FieldKind::Password).cloned().collect();
    let synthesizer = FormSynthesizer::profile(editable.into());

    let records = match app.client.list_records().await {
        Ok(records) => records,
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            warn!("Could not load records, editing an empty form: {}", e);
            Vec::new()
        }
    };
    let mut form = synthesizer.build_for_id(&records, &json!(id));
    apply_edits(&mut form, edits)?;
    form.submit()?;

    let payload = app.transformer(&synthesizer).excluding("Password").transform_update(&json!(id), &form);
    app.client.update_record(id, &payload).await?;
    info!("Record {} updated", id);
    Ok(ViewOutcome::message(format!("Record {} updated.", id)).navigate(Route::Dashboard(id)))
}

pub async fn create(app: &App, edits: &[(String, String)]) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Records) {
        return Ok(redirect);
    }
    let synthesizer = app.synthesizer().await?;
    let mut form = synthesizer.build_empty();
    apply_edits(&mut form, edits)?;
    form.submit()?;

    let payload = app.transformer(&synthesizer).transform_form(&form);
    app.client.create_record(&payload).await?;
    Ok(ViewOutcome::message("Record created.").navigate(Route::Records))
}

pub async fn delete(app: &App, id: i64) -> Result<ViewOutcome, ViewError> {
    if let Some(redirect) = app.guard(Route::Records) {
        return Ok(redirect);
    }
    app.client.delete_record(id).await?;
    Ok(ViewOutcome::message(format!("Record {} deleted.", id)).navigate(Route::Records))
}

pub async fn password_update(
    app: &App,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<ViewOutcome, ViewError> {
    let Some(user_id) = app.session.current_user_id() else {
        return Ok(ViewOutcome::message("User not authenticated. Please login again.").navigate(Route::Login));
    };
    if let Some(redirect) = app.guard(Route::UpdatePassword(user_id)) {
        return Ok(redirect);
    }
    let mut form = password_update_form();
    form.set_value("currentPassword", current_password)?;
    form.set_value("newPassword", new_password)?;
    form.set_value("confirmPassword", confirm_password)?;
    form.submit()?;

    let change = PasswordChange {
        current_password: current_password.to_string(),
        new_password: new_password.to_string(),
        confirm_password: confirm_password.to_string(),
    };
    let message = app.client.edit_password(user_id, &change).await?;
    Ok(ViewOutcome::message(message.unwrap_or_else(|| "Password updated successfully!".to_string()))
        .navigate(Route::Dashboard(user_id)))
}

/// Resets the password by email and ends the current session.
pub async fn password_reset(
    app: &App,
    email: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<ViewOutcome, ViewError> {
    let mut form = password_reset_form();
    form.set_value("email", email)?;
    form.set_value("newPassword", new_password)?;
    form.set_value("confirmPassword", confirm_password)?;
    form.submit()?;

    let reset = PasswordReset {
        email: email.to_string(),
        new_password: new_password.to_string(),
        confirm_password: confirm_password.to_string(),
    };
    app.client.reset_password(&reset).await?;
    app.session.clear()?;
    Ok(ViewOutcome::message("Password changed successfully! Please log in again.").navigate(Route::Login))
}

/// The active profile schema, one row per field.
pub async fn schema(app: &App) -> Result<ViewOutcome, ViewError> {
    let fields = app.registry.fields().await?;
    let rows = fields
        .iter()
        .map(|field| {
            let rules: Vec<&str> = field.validations.iter().map(|r| r.rule.as_str()).collect();
            let options: Vec<&str> = field.options.iter().map(|o| o.label.as_str()).collect();
            DisplayRow {
                name: field.name.clone(),
                label: field.label.clone(),
                value: format!("{:?} options=[{}] rules=[{}]", field.kind, options.join(", "), rules.join(", ")),
            }
        })
        .collect();
    Ok(ViewOutcome::message(format!("{} fields", fields.len())).with_rows(rows))
}
