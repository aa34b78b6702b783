//! In-memory session storage.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use aether_core::{PersistedSession, Result, SessionStorage};

/// Session storage that lives as long as the process.
///
/// Useful for short-lived tools and tests; the CLI persists to a file
/// instead.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a session.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// Returns a copy of what is currently stored.
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, session: Option<PersistedSession>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        self.replace(Some(session.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.replace(None);
        Ok(())
    }
}
