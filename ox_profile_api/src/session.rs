use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::error::ApiError;

pub const TOKEN_KEY: &str = "jwt_token";
pub const USER_ID_KEY: &str = "current_user_id";
pub const USERNAME_KEY: &str = "username";

/// String key/value persistence for session data.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

fn poisoned<T>(_: T) -> ApiError {
    ApiError::Store("session store lock poisoned".to_string())
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.values.lock().map_err(poisoned)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.values.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// Keeps the session in a JSON object on disk, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store; a missing file is an empty session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| ApiError::Store(e.to_string()))?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| ApiError::Store(e.to_string()))?
            }
        } else {
            debug!("Session file {:?} does not exist yet", path);
            HashMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), ApiError> {
        let contents = serde_json::to_string_pretty(values).map_err(|e| ApiError::Store(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| ApiError::Store(e.to_string()))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut values = self.values.lock().map_err(poisoned)?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut values = self.values.lock().map_err(poisoned)?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// Snapshot of the persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
}

impl Session {
    /// Authenticated means both a token and a user id are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }
}

/// The one session object shared by the client, guards and views.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    changes: watch::Sender<Session>,
}

impl SessionManager {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        let store: Box<dyn SessionStore> = Box::new(store);
        let initial = read_session(store.as_ref());
        let (changes, _) = watch::channel(initial);
        Self { store, changes }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn establish(&self, token: &str, user_id: i64, username: &str) -> Result<(), ApiError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_ID_KEY, &user_id.to_string())?;
        self.store.set(USERNAME_KEY, username)?;
        info!("Session established for user {} ({})", username, user_id);
        self.notify();
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        for key in [TOKEN_KEY, USER_ID_KEY, USERNAME_KEY] {
            self.store.remove(key)?;
        }
        info!("Session cleared");
        self.notify();
        Ok(())
    }

    pub fn current(&self) -> Session {
        read_session(self.store.as_ref())
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_authenticated()
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.current().user_id
    }

    pub fn username(&self) -> Option<String> {
        self.current().username
    }

    /// Upper-cased first letter of the username, for avatars.
    pub fn user_initial(&self) -> Option<char> {
        self.username()?.chars().next().map(|c| c.to_ascii_uppercase())
    }

    /// Receiver that observes every change to the session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_replace(self.current());
    }
}

fn read_session(store: &dyn SessionStore) -> Session {
    let user_id = store.get(USER_ID_KEY).and_then(|raw| match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            warn!("Ignoring invalid stored user id {:?}", raw);
            None
        }
    });
    Session {
        token: store.get(TOKEN_KEY).filter(|t| !t.is_empty()),
        user_id,
        username: store.get(USERNAME_KEY).filter(|u| !u.is_empty()),
    }
}
