// src/widget/session.rs
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Key the session token is stored under.
pub const SESSION_KEY: &str = "niet_chat_session";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client-local key/value storage that outlives one widget.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Single inserts and lookups cannot leave the map half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, one string value per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// `s_` followed by ten base-36 characters.
pub fn generate_session_id() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut token = String::with_capacity(2 + TOKEN_LEN);
    token.push_str("s_");
    for _ in 0..TOKEN_LEN {
        token.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    token
}

/// Returns the stored token, creating and persisting one on first use.
pub fn get_or_create(store: &dyn SessionStore) -> Result<String, StoreError> {
    if let Some(existing) = store.get(SESSION_KEY)?.filter(|s| !s.is_empty()) {
        return Ok(existing);
    }
    let sid = generate_session_id();
    store.set(SESSION_KEY, &sid)?;
    debug!(session_id = %sid, "created chat session token");
    Ok(sid)
}
