//! Login credentials and the stored session credential.

use std::fmt;

use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::PersistedSession;
use crate::types::ScopeId;
use crate::Result;

/// Login credentials for the `/auth/login` endpoint.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use aether_core::Credentials;
///
/// let creds = Credentials::new("ada@example.com", "hunter2");
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request body.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The credential of an authenticated session.
///
/// The access and refresh tokens always travel together: the only ways to
/// change them are to build a new `Credential` or call [`Credential::renewed`],
/// which replaces both at once. The scope (active company) is carried along
/// and survives renewals.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    scope: Option<ScopeId>,
}

impl Credential {
    /// Create a credential with no active scope.
    pub fn new(access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            scope: None,
        }
    }

    /// Set the active scope.
    pub fn with_scope(mut self, scope: Option<ScopeId>) -> Self {
        self.scope = scope;
        self
    }

    /// Returns a copy holding a new token pair and the same scope.
    pub fn renewed(&self, access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            scope: self.scope.clone(),
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Returns the active scope, if any.
    pub fn scope(&self) -> Option<&ScopeId> {
        self.scope.as_ref()
    }

    /// Convert into the persisted key/value form.
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            access_token: Some(self.access_token.as_str().to_string()),
            refresh_token: Some(self.refresh_token.as_str().to_string()),
            current_company_id: self.scope.as_ref().map(|s| s.as_str().to_string()),
        }
    }

    /// Restore a credential from persisted keys.
    ///
    /// Returns `Ok(None)` unless both tokens are present; a lone token is
    /// never turned into a half credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted company id is not a valid scope id.
    pub fn from_persisted(persisted: &PersistedSession) -> Result<Option<Self>> {
        let (Some(access), Some(refresh)) = (
            persisted.access_token.as_deref(),
            persisted.refresh_token.as_deref(),
        ) else {
            return Ok(None);
        };

        let scope = persisted
            .current_company_id
            .as_deref()
            .map(ScopeId::new)
            .transpose()?;

        Ok(Some(
            Self::new(AccessToken::new(access), RefreshToken::new(refresh)).with_scope(scope),
        ))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("tokens", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}
