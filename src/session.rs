use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::StoreError, models::SessionUser};

/// Session
///
/// The client's record of an authenticated identity. It is only ever replaced
/// wholesale: written on login, removed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    /// Bearer credential from the Auth Service. Absent when the service relies on cookies.
    pub token: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user: SessionUser, token: Option<String>) -> Self {
        Self {
            user,
            token,
            issued_at: Some(Utc::now()),
        }
    }

    /// Serialized form kept in the store.
    pub fn to_entry(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a stored entry. Anything that is not a JSON session whose user
    /// carries a string `role` is an error.
    pub fn from_entry(entry: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(entry)
    }
}

// 1. SessionStore Contract
/// SessionStore
///
/// A single string-keyed slot holding the serialized Session. Implementations
/// must make `set` an atomic replace: a reader sees either the old entry or the
/// new one, never a partial write.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&self, entry: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// SessionState
///
/// Shared handle injected into the guard and the login/logout flows.
pub type SessionState = Arc<dyn SessionStore>;

/// SessionLookup
///
/// Outcome of reading and parsing the store in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Active(Session),
    Missing,
    Malformed,
}

/// lookup_session
///
/// Reads the store and parses the entry. Never fails: an unreadable store is
/// reported as `Missing`, an entry that is present but undecodable or
/// unparseable as `Malformed`.
pub fn lookup_session(store: &dyn SessionStore) -> SessionLookup {
    let entry = match store.get() {
        Ok(Some(entry)) => entry,
        Ok(None) => return SessionLookup::Missing,
        Err(e @ StoreError::Undecodable(_)) => {
            tracing::warn!(error = %e, "stored session is malformed; treating as signed out");
            return SessionLookup::Malformed;
        }
        Err(e) => {
            tracing::warn!(error = %e, "session store unreadable; treating as signed out");
            return SessionLookup::Missing;
        }
    };

    match Session::from_entry(&entry) {
        Ok(session) => SessionLookup::Active(session),
        Err(e) => {
            tracing::warn!(error = %e, "stored session is malformed; treating as signed out");
            SessionLookup::Malformed
        }
    }
}

/// save_session
///
/// Serializes and writes `session`, replacing whatever was stored.
pub fn save_session(store: &dyn SessionStore, session: &Session) -> Result<(), StoreError> {
    store.set(&session.to_entry()?)
}

// 2. In-memory Implementation
/// MemorySessionStore
///
/// Process-local store. Used by tests and by anything that does not need the
/// session to outlive the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entry: RwLock<Option<String>>,
    /// When true, `set` and `clear` fail with an I/O error. Reads still work.
    should_fail: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a raw entry, well-formed or not.
    pub fn with_entry(entry: impl Into<String>) -> Self {
        Self {
            entry: RwLock::new(Some(entry.into())),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            entry: RwLock::new(None),
            should_fail: true,
        }
    }

    fn simulated_failure() -> StoreError {
        StoreError::Io(io::Error::other("simulated session store failure"))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        let guard = self.entry.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, entry: &str) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(Self::simulated_failure());
        }
        let mut guard = self.entry.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(entry.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(Self::simulated_failure());
        }
        let mut guard = self.entry.write().map_err(|_| StoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

// 3. File Implementation
/// FileSessionStore
///
/// Keeps the entry in a single JSON file so a session survives between
/// separate invocations of the `hub` CLI. Writes go to a sibling temp file which
/// is then renamed over the entry.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8(bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, entry: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, entry)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
