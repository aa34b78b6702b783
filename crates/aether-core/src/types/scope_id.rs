//! Scope (company) identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum accepted length of a scope id.
const MAX_LEN: usize = 128;

/// The company (tenant) a request is scoped to, sent as `X-Company-Id`.
///
/// Scope ids are opaque to the client. They must be non-empty, at most
/// 128 characters, and made of visible ASCII so they are always valid
/// header values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
    /// Create a scope id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, too long, or contains
    /// whitespace or non-ASCII characters.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ScopeId {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if s.len() > MAX_LEN {
            return Err(invalid("too long"));
        }
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(invalid("must be visible ASCII without whitespace"));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScopeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ScopeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ScopeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ScopeId::new(&s).map_err(serde::de::Error::custom)
    }
}
