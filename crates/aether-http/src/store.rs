//! Credential store.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use aether_core::{Credential, Result, SessionStorage};

/// Holds the session credential and writes it through to storage.
///
/// The in-memory value is authoritative and is swapped synchronously, so a
/// reader sees either the old credential or the new one, never a mix.
/// Persistence happens afterwards in [`CredentialStore::persist`]; writes are
/// serialized and always store the latest in-memory value.
///
/// Only the refresh coordinator and the client's login/logout flow mutate
/// the store.
pub struct CredentialStore {
    current: RwLock<Option<Credential>>,
    storage: Option<Arc<dyn SessionStorage>>,
    persist_lock: Mutex<()>,
}

impl CredentialStore {
    /// A store with no backing storage.
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            storage: None,
            persist_lock: Mutex::new(()),
        }
    }

    /// A store initialized from, and writing through to, `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or holds an invalid
    /// session.
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let credential = match storage.load().await? {
            Some(persisted) => Credential::from_persisted(&persisted)?,
            None => None,
        };
        debug!(restored = credential.is_some(), "Loaded session from storage");

        Ok(Self {
            current: RwLock::new(credential),
            storage: Some(storage),
            persist_lock: Mutex::new(()),
        })
    }

    /// Returns the current credential.
    pub fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, credential: Credential) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    pub(crate) fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Write the current credential to storage.
    ///
    /// Failures are logged and swallowed: losing persistence must not fail
    /// the request that caused the write.
    pub(crate) async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        let _guard = self.persist_lock.lock().await;
        let result = match self.get() {
            Some(credential) => storage.save(&credential.to_persisted()).await,
            None => storage.clear().await,
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("credential", &self.get())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}
