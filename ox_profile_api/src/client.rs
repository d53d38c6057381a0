use std::sync::Arc;

use log::{debug, info, trace, warn};
use ox_forms::Record;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::session::SessionManager;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5263/api";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl RegisterRequest {
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub email: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// HTTP client for the profile backend.
///
/// Record and password-change calls carry the session's bearer token. A 401
/// on one of those calls clears the session.
pub struct ProfileClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ProfileClient {
    pub fn new(base_url: &str, session: Arc<SessionManager>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, authenticated: bool) -> Result<Response, ApiError> {
        let request = if authenticated { self.authorized(request) } else { request };
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        if status == StatusCode::UNAUTHORIZED && authenticated {
            warn!("Authentication failed, clearing the session");
            self.session.clear()?;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MessageBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        trace!("Response body: {}", body);
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn list_records(&self) -> Result<Vec<Record>, ApiError> {
        let response = self.send(self.http.get(self.url("forms")), true).await?;
        Self::read(response).await
    }

    pub async fn get_record(&self, id: i64) -> Result<Record, ApiError> {
        let response = self.send(self.http.get(self.url(&format!("forms/{}", id))), true).await?;
        Self::read(response).await
    }

    pub async fn get_record_by_user(&self, user_id: i64) -> Result<Record, ApiError> {
        let response = self
            .send(self.http.get(self.url(&format!("forms/user/{}", user_id))), true)
            .await?;
        Self::read(response).await
    }

    pub async fn create_record(&self, payload: &Map<String, Value>) -> Result<Value, ApiError> {
        let response = self.send(self.http.post(self.url("forms")).json(payload), true).await?;
        Self::read(response).await
    }

    pub async fn update_record(&self, id: i64, payload: &Map<String, Value>) -> Result<Value, ApiError> {
        let response = self
            .send(self.http.put(self.url(&format!("forms/{}", id))).json(payload), true)
            .await?;
        Self::read(response).await
    }

    pub async fn delete_record(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(&format!("forms/{}", id))), true).await?;
        info!("Deleted record {}", id);
        Ok(())
    }

    /// Logs in and stores the returned session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self
            .send(self.http.post(self.url("auth/login")).json(credentials), false)
            .await?;
        let login: LoginResponse = Self::read(response).await?;
        self.session.establish(&login.token, login.user_id, &login.username)?;
        Ok(login)
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<Value, ApiError> {
        let response = self
            .send(self.http.post(self.url("auth/register")).json(registration), false)
            .await?;
        Self::read(response).await
    }

    /// Registers, then logs in with the same credentials.
    pub async fn register_and_login(&self, registration: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        self.register(registration).await?;
        self.login(&registration.credentials()).await
    }

    /// Returns the backend's confirmation message, if any.
    pub async fn edit_password(&self, user_id: i64, change: &PasswordChange) -> Result<Option<String>, ApiError> {
        let response = self
            .send(self.http.put(self.url(&format!("auth/{}/password", user_id))).json(change), true)
            .await?;
        let body: Option<MessageBody> = Self::read(response).await.unwrap_or(None);
        Ok(body.and_then(|b| b.message))
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Option<String>, ApiError> {
        let response = self
            .send(self.http.post(self.url("auth/forgot-password")).json(reset), false)
            .await?;
        let body: Option<MessageBody> = Self::read(response).await.unwrap_or(None);
        Ok(body.and_then(|b| b.message))
    }
}
