use std::time::Duration;

use log::{debug, warn};

use crate::error::ApiError;
use crate::session::SessionManager;

/// Linear back-off: attempt `n` waits `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// Reads the current user id, waiting for it to appear if the session is still settling.
pub async fn resolve_user_id(session: &SessionManager, policy: &RetryPolicy) -> Result<i64, ApiError> {
    let mut attempt = 0;
    loop {
        if let Some(user_id) = session.current_user_id() {
            return Ok(user_id);
        }
        if attempt >= policy.max_retries {
            warn!("No user id after {} retries", attempt);
            return Err(ApiError::NoUserId);
        }
        attempt += 1;
        let delay = policy.base_delay * attempt;
        debug!("User id not available yet, retry {} in {:?}", attempt, delay);
        tokio::time::sleep(delay).await;
    }
}
