//! Durable storage for the session token.
//!
//! The persisted state is a single string (the token) stored under
//! `<namespace>.token`. [`FileStorage`] keeps it in a JSON object file so a
//! later process can restore the session; [`MemoryStorage`] keeps it for
//! the lifetime of the value.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::ClientError;

/// Where a [`SessionStore`](super::session::SessionStore) mirrors its token.
pub trait TokenStorage {
    /// Read the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backing store exists but cannot be read.
    fn load(&self) -> Result<Option<String>, ClientError>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backing store cannot be written.
    fn save(&self, token: &str) -> Result<(), ClientError>;

    /// Remove the persisted token. Erasing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backing store cannot be written.
    fn erase(&self) -> Result<(), ClientError>;
}

/// In-process storage, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    token: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.slot() = Some(token.to_owned());
        Ok(())
    }

    fn erase(&self) -> Result<(), ClientError> {
        *self.slot() = None;
        Ok(())
    }
}

/// JSON-object file keyed by `<namespace>.token`.
///
/// Other keys in the file are preserved, so several namespaces can share
/// one file. Unreadable JSON is logged and treated as an empty file, so a
/// damaged session file reads as logged out and is replaced on next write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    key: String,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, namespace: &str) -> Self {
        Self { path: path.into(), key: format!("{namespace}.token") }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_map(&self) -> Result<Map<String, Value>, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "session file is not a JSON object; starting empty");
                Ok(Map::new())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session file is corrupt; starting empty");
                Ok(Map::new())
            }
        }
    }

    /// Write through a sibling temp file renamed over the target, so a
    /// crash mid-write leaves the previous contents in place.
    fn write_map(&self, map: Map<String, Value>) -> Result<(), ClientError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let rendered = serde_json::to_string_pretty(&Value::Object(map))?;

        let mut scratch = tempfile::NamedTempFile::new_in(dir)?;
        scratch.write_all(rendered.as_bytes())?;
        scratch.as_file().sync_all()?;
        scratch.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let map = self.read_map()?;
        Ok(map.get(&self.key).and_then(Value::as_str).map(str::to_owned))
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        let mut map = self.read_map()?;
        map.insert(self.key.clone(), Value::String(token.to_owned()));
        self.write_map(map)
    }

    fn erase(&self) -> Result<(), ClientError> {
        let mut map = self.read_map()?;
        if map.remove(&self.key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_map(map)
    }
}
