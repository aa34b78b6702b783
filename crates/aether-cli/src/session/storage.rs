//! Session storage for persisting login state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use tracing::debug;

use aether_core::{Error, PersistedSession, SessionStorage};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stores the session as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `session.json` in the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dirs =
            ProjectDirs::from("", "", "aether").context("Could not determine data directory")?;
        Ok(Self::new(dirs.data_dir().join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, session: &PersistedSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> aether_core::Result<Option<PersistedSession>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };

        let session = serde_json::from_str(&json).map_err(|e| Error::Storage {
            message: format!("invalid session file {}: {e}", self.path.display()),
        })?;
        debug!(path = %self.path.display(), "Loaded session file");
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> aether_core::Result<()> {
        self.write(session)
            .map_err(|e| storage_error("write", &self.path, e))?;
        debug!(path = %self.path.display(), "Saved session file");
        Ok(())
    }

    async fn clear(&self) -> aether_core::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

fn storage_error(action: &str, path: &Path, err: io::Error) -> Error {
    Error::Storage {
        message: format!("failed to {action} session file {}: {err}", path.display()),
    }
}
