//! Response classification.
//!
//! [`classify`] turns a raw HTTP response into one of three outcomes:
//! success, an expired access token, or a typed [`Error`]. It is a pure
//! function and the only place where error bodies are interpreted.
//!
//! The backend answers errors in one of these shapes:
//!
//! ```json
//! {"detail": "Transaction not found"}
//! {"detail": [{"loc": ["body", "amount"], "msg": "must be positive", "type": "value_error"}]}
//! {"errors": [{"field": "amount", "message": "must be positive"}]}
//! {"message": "..."}
//! ```

use std::time::Duration;

use serde_json::Value;

use crate::error::{Error, ErrorKind, FieldError};

/// Longest plain-text body that is surfaced as a message.
const MAX_TEXT_MESSAGE: usize = 200;

/// Location prefixes stripped from validation paths.
const LOCATION_PREFIXES: &[&str] = &["body", "query", "path", "header", "cookie"];

/// The parts of an HTTP response the classifier looks at.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (delta-seconds form only).
    pub retry_after: Option<Duration>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }
}

/// Outcome of classifying a response.
#[derive(Debug, Clone)]
pub enum Classification {
    /// 2xx.
    Success,
    /// 401: the access token must be renewed. Never surfaced to callers.
    AuthExpired,
    /// Any other failure, already typed.
    Failure(Error),
}

/// Classify a raw response.
pub fn classify(response: &RawResponse) -> Classification {
    let status = response.status;
    let Some(kind) = ErrorKind::from_status(status) else {
        return Classification::Success;
    };

    if kind == ErrorKind::AuthExpired {
        return Classification::AuthExpired;
    }

    let body = ErrorBody::parse(&response.body);
    let message = body.message;

    let error = match kind {
        ErrorKind::BadRequest => Error::BadRequest { status, message },
        ErrorKind::Forbidden => Error::Forbidden { message },
        ErrorKind::NotFound => Error::NotFound { message },
        ErrorKind::Validation => Error::Validation {
            fields: body.fields,
            message,
        },
        ErrorKind::RateLimited => Error::RateLimited {
            retry_after: response.retry_after,
            message,
        },
        ErrorKind::ServiceUnavailable => Error::ServiceUnavailable { status, message },
        // from_status never yields the remaining kinds for a status code.
        _ => Error::ServerError { status, message },
    };

    Classification::Failure(error)
}

/// Parse a `Retry-After` header value given in seconds.
///
/// HTTP-date values are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[derive(Debug, Default)]
struct ErrorBody {
    message: Option<String>,
    fields: Vec<FieldError>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_json(&value),
            Err(_) => Self {
                message: plain_text_message(body),
                fields: Vec::new(),
            },
        }
    }

    fn from_json(value: &Value) -> Self {
        let mut parsed = ErrorBody::default();

        match value.get("detail") {
            Some(Value::String(message)) => parsed.message = Some(message.clone()),
            Some(Value::Array(items)) => {
                parsed.fields = items.iter().filter_map(detail_field).collect();
            }
            _ => {}
        }

        if parsed.fields.is_empty()
            && let Some(Value::Array(items)) = value.get("errors")
        {
            parsed.fields = items.iter().filter_map(errors_field).collect();
        }

        if parsed.message.is_none() {
            parsed.message = ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .map(str::to_string);
        }

        parsed
    }
}

/// `{"loc": ["body", "amount"], "msg": "..."}`
fn detail_field(item: &Value) -> Option<FieldError> {
    let message = item.get("msg")?.as_str()?;
    let mut segments: Vec<String> = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|loc| {
            loc.iter()
                .filter_map(|segment| match segment {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if segments.len() > 1 && LOCATION_PREFIXES.contains(&segments[0].as_str()) {
        segments.remove(0);
    }

    Some(FieldError::new(segments.join("."), message))
}

/// `{"field": "amount", "message": "..."}`
fn errors_field(item: &Value) -> Option<FieldError> {
    let message = item.get("message")?.as_str()?;
    let field = item.get("field").and_then(Value::as_str).unwrap_or("");
    Some(FieldError::new(field, message))
}

fn plain_text_message(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    // Skip empty bodies and HTML error pages from proxies.
    if text.is_empty() || text.starts_with('<') || text.len() > MAX_TEXT_MESSAGE {
        return None;
    }
    Some(text.to_string())
}
