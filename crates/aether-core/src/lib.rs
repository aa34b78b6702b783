//! aether-core - Core types and traits for the Aether API client.
//!
//! This crate holds everything that does not touch the network: the
//! credential and token types, the closed error taxonomy, the status-code
//! classifier, and the traits implemented by the client's collaborators
//! (session persistence and user-facing notifications).

pub mod classify;
pub mod credentials;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use classify::{Classification, RawResponse, classify};
pub use credentials::{Credential, Credentials};
pub use error::{Error, ErrorKind, FieldError, TerminationReason};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{Notice, NotificationSink, PersistedSession, SessionStorage};
pub use types::{ApiUrl, ScopeId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
