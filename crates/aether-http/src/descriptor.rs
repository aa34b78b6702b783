//! Request descriptors.

use std::fmt;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

use aether_core::error::InvalidInputError;
use aether_core::{Result, ScopeId};

/// Correlation id sent as `X-Request-Id`, unique per dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Everything needed to send one request.
///
/// A descriptor is built up front and consumed by
/// [`ApiClient::dispatch`](crate::ApiClient::dispatch). When the request has
/// to be replayed after a token renewal, the client derives a new descriptor
/// with a fresh trace id and the replay flag set; the original is never
/// mutated.
///
/// Headers set here are sent as-is, except `Authorization`, `X-Company-Id`
/// and `X-Request-Id`, which the client always sets itself.
#[derive(Debug)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
    scope: Option<ScopeId>,
    trace_id: TraceId,
    retried: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on an endpoint path relative to the
    /// API base URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            scope: None,
            trace_id: TraceId::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized to JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not valid JSON: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Add an extra header.
    ///
    /// `Authorization`, `X-Company-Id` and `X-Request-Id` are always set by
    /// the client and replace any value given here.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let invalid = || InvalidInputError::Header {
            name: name.to_string(),
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }

    /// Send this request for a specific company instead of the active one.
    pub fn scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Scope override, if one was set on this descriptor.
    pub fn scope_override(&self) -> Option<&ScopeId> {
        self.scope.as_ref()
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// True if this descriptor is the replay of a request that failed with
    /// an expired token.
    pub fn is_replay(&self) -> bool {
        self.retried
    }

    /// Derive the replay of this request: same method, path, query, body,
    /// headers and scope, with a new trace id and the replay flag set.
    pub(crate) fn replay(&self) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
            headers: self.headers.clone(),
            scope: self.scope.clone(),
            trace_id: TraceId::new(),
            retried: true,
        }
    }
}
