use ox_forms::FormError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not authorized, the session has been cleared")]
    Unauthorized,
    #[error("no user id found, please log in")]
    NoUserId,
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("session store error: {0}")]
    Store(String),
    #[error(transparent)]
    Form(#[from] FormError),
}

impl ApiError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
