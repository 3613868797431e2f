//! Persisted credential storage.
//!
//! The client holds exactly one credential, kept in a single named slot.
//! Writes are last-writer-wins: the most recent valid token is the one
//! that counts.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::AuthError;

/// A single-slot store for the raw access token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> Result<Option<String>, AuthError>;

    /// Replace the stored token.
    fn save(&self, raw: &str) -> Result<(), AuthError>;

    /// Remove the stored token. Clearing an empty slot is a no-op.
    fn clear(&self) -> Result<(), AuthError>;
}

/// File-backed token store under the user data directory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default slot: `<data dir>/bzcommerce/token`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bzcommerce")
            .join("token")
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AuthError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }
}

/// In-memory token store, used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, AuthError> {
        Ok(self.slot.lock().map(|s| s.clone()).unwrap_or(None))
    }

    fn save(&self, raw: &str) -> Result<(), AuthError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(raw.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}
