//! Session persistence trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The persisted form of a session.
///
/// Field names are the storage keys shared with other clients of the same
/// backend, so they must not be renamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_company_id: Option<String>,
}

/// Durable storage for the session credential.
///
/// The client reads it once at initialization and writes it after every
/// credential swap, scope switch or teardown.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the stored session, if any.
    async fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the stored session.
    async fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Remove the stored session.
    async fn clear(&self) -> Result<()>;
}
