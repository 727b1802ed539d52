//! Session providers.
//!
//! Consumers never reach for ambient storage; they receive a
//! [`SessionStore`] and call `get`/`set`/`clear` on it. The file-backed store
//! keeps a small JSON object of key to serialized text, with the session under
//! [`SESSION_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::client::error::{ClientError, Result};
use crate::client::types::Session;

/// Fixed storage key of the persisted session.
pub const SESSION_KEY: &str = "loggedInUser";

pub trait SessionStore: Send + Sync {
    /// The current session, if one is stored and readable.
    fn get(&self) -> Option<Session>;

    fn set(&self, session: Session) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Process-local store, useful for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, session: Session) -> Result<()> {
        let mut guard = self
            .session
            .write()
            .map_err(|e| ClientError::Session(e.to_string()))?;
        *guard = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .write()
            .map_err(|e| ClientError::Session(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Session persisted to a JSON key-value file so it survives between runs.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ClientError::Session(format!("{} is not a valid store: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ClientError::Session(e.to_string()))?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| ClientError::Session(e.to_string()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        let _guard = self.lock.read().ok()?;
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session store: {}", e);
                return None;
            }
        };
        let raw = entries.get(SESSION_KEY)?;
        match serde_json::from_str(raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Ignoring malformed stored session: {}", e);
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| ClientError::Session(e.to_string()))?;
        let mut entries = self.read_entries()?;
        let raw = serde_json::to_string(&session).map_err(|e| ClientError::Session(e.to_string()))?;
        entries.insert(SESSION_KEY.to_string(), raw);
        self.write_entries(&entries)?;
        tracing::debug!("Stored session for user {} in {}", session.user.id, self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| ClientError::Session(e.to_string()))?;
        let mut entries = self.read_entries()?;
        if entries.remove(SESSION_KEY).is_some() {
            self.write_entries(&entries)?;
            tracing::debug!("Cleared session from {}", self.path.display());
        }
        Ok(())
    }
}
