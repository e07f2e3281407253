//! Persisted session state
//!
//! The session file holds the authentication token and the last-known
//! user profile as a single JSON document. Storing them together keeps
//! the pair consistent: a purge removes both atomically, so the client
//! can never rehydrate a token without a user.
//!
//! The file lives in the user's data directory by default. The
//! `TRAZO_SESSION_FILE` environment variable overrides the location,
//! which makes it easy to point the binary at a test file or an
//! alternate profile without touching the real session.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::models::User;

/// The persisted token/user pair.
///
/// Invariant: a stored session always carries both fields. Partial state
/// is never written; a failed resolution purges the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque server-issued token
    pub token: String,
    /// The user the token belonged to when last verified
    pub user: User,
}

/// File-backed store for the persisted session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store at the default location.
    ///
    /// Honors the `TRAZO_SESSION_FILE` override, otherwise resolves the
    /// platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the data directory cannot be
    /// determined or created.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("TRAZO_SESSION_FILE") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "trazo", "trazo").ok_or_else(|| {
            ApiError::Storage(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine data directory",
            ))
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            path: data_dir.join("session.json"),
        })
    }

    /// Create a store that uses the specified file path.
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temporary
    /// directory).
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session.
    ///
    /// Returns `Ok(None)` when no session has been saved, so callers can
    /// distinguish "not logged in" from a genuine read failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] on read failure or
    /// [`ApiError::Decode`] when the file exists but does not parse.
    pub fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ApiError::Storage(e)),
        };
        let session = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    /// Persist the session, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Remove the persisted session. Removing an absent file is not an
    /// error, so a purge can always be retried.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(e)),
        }
    }
}
