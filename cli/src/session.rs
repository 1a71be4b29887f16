//! Cached identity of the logged-in user.
//!
//! Stored as JSON in the platform config directory, or under `NIKIT_HOME`
//! when set. There is no server-side session; the cached `userId` is sent in
//! request bodies.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::CliError;

const IDENTITY_FILE: &str = "identity.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub nickname: String,
    pub host: bool,
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self { path: dir.join(IDENTITY_FILE) }
    }

    /// Store at `NIKIT_HOME` if set, else the platform config directory.
    pub fn locate(home_override: Option<&Path>) -> Result<Self, CliError> {
        if let Some(dir) = home_override {
            return Ok(Self::in_dir(dir));
        }
        let dirs = ProjectDirs::from("com", "nikit", "nikit").ok_or(CliError::NoConfigDir)?;
        Ok(Self::in_dir(dirs.config_dir()))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Identity>, CliError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// The cached identity, or `NotLoggedIn`.
    pub fn require(&self) -> Result<Identity, CliError> {
        self.load()?.ok_or(CliError::NotLoggedIn)
    }

    pub fn save(&self, identity: &Identity) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(identity)?)?;
        Ok(())
    }

    /// Delete the cache. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool, CliError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
