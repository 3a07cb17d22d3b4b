//! Auth gate and shared secret set.
//!
//! Any member of the secret set grants full access. The set lives in a
//! small JSON document (`{"passwords": [...]}`) that is read on every
//! check and rewritten on every change.

use crate::error::{Result, TrackerError};
use crate::persist;
use crate::types::PasswordRequest;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the session cookie carrying the secret.
pub const AUTH_COOKIE: &str = "auth_token";

/// Session cookie lifetime in seconds (30 days).
pub const AUTH_COOKIE_MAX_AGE: u64 = 30 * 24 * 60 * 60;

/// On-disk shape of the secret set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub passwords: Vec<String>,
}

/// Password check in front of every core operation.
///
/// The document is re-read on every call, so passwords edited on disk take
/// effect without a restart.
pub struct AuthGate {
    path: PathBuf,
    lock: RwLock<()>,
}

impl AuthGate {
    /// Open the gate over the document at `path`. A missing document is an
    /// empty set; a corrupt one is rejected up front.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let gate = Self {
            path: path.into(),
            lock: RwLock::new(()),
        };
        gate.load()?;
        Ok(gate)
    }

    /// Check a caller-supplied token.
    pub fn authorize(&self, token: &str) -> Result<()> {
        let _guard = self.lock.read();
        if self.load()?.passwords.iter().any(|p| p == token) {
            Ok(())
        } else {
            Err(TrackerError::Unauthorized)
        }
    }

    /// Validate a login password. On success returns the value to store in
    /// the [`AUTH_COOKIE`] cookie.
    pub fn login(&self, password: &str) -> Result<String> {
        self.authorize(password)?;
        tracing::debug!("login accepted");
        Ok(password.to_string())
    }

    pub fn list(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read();
        Ok(self.load()?.passwords)
    }

    /// Add a password; returns the updated set.
    pub fn add(&self, password: &str) -> Result<Vec<String>> {
        let _guard = self.lock.write();
        let mut secrets = self.load()?;
        if secrets.passwords.iter().any(|p| p == password) {
            return Err(TrackerError::PasswordExists);
        }

        secrets.passwords.push(password.to_string());
        persist::write_json(&self.path, &secrets)?;

        tracing::info!(count = secrets.passwords.len(), "password added");
        Ok(secrets.passwords)
    }

    /// Remove a password; returns the updated set. The last password can
    /// never be removed.
    pub fn remove(&self, password: &str) -> Result<Vec<String>> {
        let _guard = self.lock.write();
        let mut secrets = self.load()?;
        if !secrets.passwords.iter().any(|p| p == password) {
            return Err(TrackerError::PasswordNotFound);
        }
        if secrets.passwords.len() <= 1 {
            return Err(TrackerError::LastPassword);
        }

        secrets.passwords.retain(|p| p != password);
        persist::write_json(&self.path, &secrets)?;

        tracing::info!(count = secrets.passwords.len(), "password removed");
        Ok(secrets.passwords)
    }

    /// Dispatch a password-management request on its action.
    pub fn apply(&self, request: &PasswordRequest) -> Result<Vec<String>> {
        match request.action.to_lowercase().as_str() {
            "add" => self.add(&request.password),
            "remove" => self.remove(&request.password),
            other => Err(TrackerError::InvalidAction(other.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SecretConfig> {
        Ok(persist::read_json(&self.path)?.unwrap_or_default())
    }
}
