//! File-backed persistence for the opaque bearer token.
//!
//! The token is the only piece of client state that survives a restart.
//! It is loaded once at construction into an in-memory mirror; writes go
//! to the file before memory so a crash can never leave memory claiming a
//! session the disk does not back.

use std::{
    fs, io,
    path::PathBuf,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use thiserror::Error;

/// Errors raised by token persistence.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Reading or writing the token file failed.
    #[error("token storage error")]
    Io(#[from] io::Error),
}

/// Durable storage for the session's bearer token.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl TokenStore {
    /// Opens the store at `path`, loading any persisted token.
    ///
    /// A missing file means no persisted session; a blank file is treated
    /// the same way.
    ///
    /// # Errors
    ///
    /// Returns an error when the token file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let path = path.into();

        let cached = match fs::read_to_string(&path) {
            Ok(raw) => {
                let token = raw.trim();

                (!token.is_empty()).then(|| token.to_string())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.read().clone()
    }

    /// Persists `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error when the token file cannot be written; the
    /// in-memory token is left unchanged in that case.
    pub fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, token)?;
        *self.write() = Some(token.to_string());

        Ok(())
    }

    /// Removes the persisted token. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the token file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }

        *self.write() = None;

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.cached.write().unwrap_or_else(PoisonError::into_inner)
    }
}
