//! HTTP transport.
//!
//! Sends requests and hands back the raw status, `Retry-After` and body.
//! It never interprets a response; that is the classifier's job.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use aether_core::classify::parse_retry_after;
use aether_core::error::{InvalidInputError, TransportError};
use aether_core::{AccessToken, ApiUrl, Error, RawResponse, Result, ScopeId};

use crate::config::ClientConfig;
use crate::descriptor::{RequestDescriptor, TraceId};

/// Active company header.
pub const X_COMPANY_ID: &str = "x-company-id";

/// Per-attempt correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent_value())
            .timeout(config.request_timeout_value())
            .build()
            .map_err(|e| InvalidInputError::Other {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            request_timeout: config.request_timeout_value(),
        })
    }

    /// Send one attempt of a described request.
    #[instrument(
        skip(self, descriptor, access_token, scope),
        fields(method = %descriptor.method(), path = descriptor.path(), trace_id = %descriptor.trace_id())
    )]
    pub async fn send(
        &self,
        descriptor: &RequestDescriptor,
        access_token: Option<&AccessToken>,
        scope: Option<&ScopeId>,
    ) -> Result<RawResponse> {
        let url = self.base_url.endpoint(descriptor.path());
        debug!(replay = descriptor.is_replay(), "Sending request");

        let headers = outgoing_headers(descriptor, access_token, scope)?;

        let mut request = self
            .client
            .request(descriptor.method().clone(), &url)
            .headers(headers);
        if !descriptor.query_pairs().is_empty() {
            request = request.query(descriptor.query_pairs());
        }
        if let Some(body) = descriptor.body() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.request_timeout))?;

        read_raw(response, self.request_timeout).await
    }

    /// POST an unauthenticated JSON body with its own timeout.
    ///
    /// Used for the login and refresh endpoints, which must not carry a
    /// bearer token.
    #[instrument(skip(self, body, trace_id), fields(trace_id = %trace_id))]
    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
        trace_id: TraceId,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.endpoint(path);
        debug!(%url, "Sending auth request");

        let mut headers = HeaderMap::new();
        insert_trace_id(&mut headers, trace_id);

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        read_raw(response, timeout).await
    }
}

/// Headers for one attempt: the descriptor's own, with the session headers
/// always taken from the client.
fn outgoing_headers(
    descriptor: &RequestDescriptor,
    access_token: Option<&AccessToken>,
    scope: Option<&ScopeId>,
) -> Result<HeaderMap> {
    let mut headers = descriptor.headers().clone();
    headers.remove(AUTHORIZATION);
    headers.remove(X_COMPANY_ID);
    headers.remove(X_REQUEST_ID);

    if let Some(token) = access_token {
        headers.insert(AUTHORIZATION, bearer(token)?);
    }
    if let Some(scope) = scope {
        headers.insert(X_COMPANY_ID, header_value(X_COMPANY_ID, scope.as_str())?);
    }
    insert_trace_id(&mut headers, descriptor.trace_id());

    Ok(headers)
}

/// Collect status, `Retry-After` and body from a response.
async fn read_raw(response: reqwest::Response, timeout: Duration) -> Result<RawResponse> {
    let status = response.status().as_u16();
    trace!(status, "Response received");

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    Ok(RawResponse::new(status, body.to_vec()).with_retry_after(retry_after))
}

/// Map a reqwest failure to a transport error.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::NetworkUnavailable(transport)
}

fn bearer(token: &AccessToken) -> Result<HeaderValue> {
    let mut value = header_value(AUTHORIZATION.as_str(), &format!("Bearer {}", token.as_str()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        InvalidInputError::Header {
            name: name.to_string(),
        }
        .into()
    })
}

fn insert_trace_id(headers: &mut HeaderMap, trace_id: TraceId) {
    // A hyphenated UUID is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        headers.insert(X_REQUEST_ID, value);
    }
}
