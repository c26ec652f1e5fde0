use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiError, Result};

/// JSON pointer to the bearer token inside the login response
const TOKEN_POINTER: &str = "/data/user/token";

/// Login response as returned by the server.
///
/// Kept opaque so it can be written back to disk exactly as received; only
/// the bearer token is read out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Value);

impl Credentials {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Bearer token at `data.user.token`, if present
    pub fn token(&self) -> Option<&str> {
        self.0.pointer(TOKEN_POINTER).and_then(Value::as_str)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

/// Credentials persisted as a single JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved credentials. A missing file is not an error.
    pub fn load(&self) -> Result<Option<Credentials>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved credentials");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let raw: Value = serde_json::from_str(&contents).map_err(|e| {
            ApiError::MalformedCredentials(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(Some(Credentials(raw)))
    }

    /// Overwrite the file with the given credentials
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(credentials)
            .map_err(|e| ApiError::MalformedCredentials(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    /// Delete the credential file if it exists
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
