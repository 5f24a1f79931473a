//! Session tokens persisted between runs in `credentials.toml`.
//!
//! The file is written with 0600 permissions on Unix. Passwords are never
//! stored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot access credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupted credentials file {path}: {message}; run `church-console login` again")]
    Corrupted { path: PathBuf, message: String },
    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub server_url: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredentials {
    pub fn token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("email", &self.email)
            .field("server_url", &self.server_url)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<StoredCredentials>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| CredentialError::Corrupted {
                path: self.path.clone(),
                message: e.message().to_string(),
            })
    }

    pub fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let contents = toml::to_string_pretty(credentials)?;
        fs::write(&self.path, contents).map_err(|source| self.io_error(source))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
        }

        tracing::debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    /// Delete the stored session; returns whether one existed
    pub fn clear(&self) -> Result<bool, CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
