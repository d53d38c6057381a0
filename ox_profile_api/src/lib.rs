//! Session handling, the profile backend client and route guards.

pub mod error;
pub mod session;
pub mod client;
pub mod retry;
pub mod routes;

pub use error::ApiError;
pub use session::{FileStore, MemoryStore, Session, SessionManager, SessionStore};
pub use client::{LoginRequest, LoginResponse, PasswordChange, PasswordReset, ProfileClient, RegisterRequest};
pub use retry::{resolve_user_id, RetryPolicy};
pub use routes::{resolve, AuthGuard, Guard, LoginGuard, Route};
