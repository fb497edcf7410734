//! services/client/src/adapters/session.rs
//!
//! Implementations of the `SessionStore` port: a process-lifetime store and a
//! file-backed store that keeps remembered credentials on disk for a week.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use podscript_core::domain::Credential;
use podscript_core::ports::{SessionStore, StorageError};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Gives a credential its seven-day expiry when it is stored persistently.
fn stamp(credential: Credential, persistent: bool) -> Credential {
    if persistent && credential.expires_at().is_none() {
        Credential::remembered(credential.token(), Utc::now())
    } else {
        credential
    }
}

//=========================================================================================
// In-Memory Store
//=========================================================================================

/// Keeps the credential for the lifetime of the process only.
#[derive(Default)]
pub struct MemorySessionStore {
    current: RwLock<Option<Credential>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out logged in.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            current: RwLock::new(Some(credential)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Credential> {
        let mut current = self.current.write();
        if current.as_ref().is_some_and(|c| c.is_expired(Utc::now())) {
            *current = None;
        }
        current.clone()
    }

    fn set(&self, credential: Credential, persistent: bool) -> Result<(), StorageError> {
        *self.current.write() = Some(stamp(credential, persistent));
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.current.write() = None;
        Ok(())
    }
}

//=========================================================================================
// File-Backed Store
//=========================================================================================

/// What a remembered credential looks like on disk.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Persists remembered credentials as JSON; session-only credentials stay in memory.
pub struct FileSessionStore {
    path: PathBuf,
    session: RwLock<Option<Credential>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: RwLock::new(None),
        }
    }

    /// `<config dir>/podscript/session.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("podscript").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Option<Credential> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let stored: StoredCredential = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let credential = Credential::with_expiry(stored.token, Some(stored.expires_at));
        if credential.is_expired(Utc::now()) {
            if let Err(e) = self.remove_file() {
                warn!("{}", e);
            }
            return None;
        }
        Some(credential)
    }

    fn write_file(&self, credential: &Credential) -> Result<(), StorageError> {
        let expires_at = credential
            .expires_at()
            .ok_or_else(|| StorageError("persistent credential without expiry".to_string()))?;
        let stored = StoredCredential {
            token: credential.token().to_string(),
            expires_at,
        };
        let json = serde_json::to_string(&stored).map_err(|e| StorageError(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| StorageError(format!("{}: {}", self.path.display(), e)))
    }

    fn remove_file(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError(format!("{}: {}", self.path.display(), e))),
        }
    }
}

// Blocking `std::fs` calls are fine here: the file holds a single token and is
// read or written once per request at most.
impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Credential> {
        if let Some(credential) = self.session.read().clone() {
            return Some(credential);
        }
        self.read_file()
    }

    fn set(&self, credential: Credential, persistent: bool) -> Result<(), StorageError> {
        let credential = stamp(credential, persistent);
        if persistent {
            self.write_file(&credential)?;
            *self.session.write() = None;
        } else {
            self.remove_file()?;
            *self.session.write() = Some(credential);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.write() = None;
        self.remove_file()
    }
}
