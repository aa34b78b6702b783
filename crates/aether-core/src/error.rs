//! Error types for the Aether client.
//!
//! Failures coming back from the API are folded into a closed taxonomy
//! ([`ErrorKind`]). The unified [`Error`] carries one variant per kind plus a
//! few local variants (invalid input, storage, state conflicts) that never
//! originate from the wire.
//!
//! [`ErrorKind::AuthExpired`] has no [`Error`] counterpart: an expired access
//! token is always resolved inside the client, either by a transparent replay
//! or by [`Error::SessionTerminated`].

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The closed set of failure kinds produced by classifying a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received at all.
    NetworkUnavailable,
    /// 400 and unlisted 4xx statuses.
    BadRequest,
    /// 401 on a first attempt. Internal only.
    AuthExpired,
    /// 401 on a replay, or renewal failed.
    SessionTerminated,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 422 with per-field details.
    Validation,
    /// 429.
    RateLimited,
    /// 500 and any other non-success status.
    ServerError,
    /// 502, 503 and 504.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Map an HTTP status code to its kind.
    ///
    /// Returns `None` for 2xx statuses. Every other status maps to exactly
    /// one kind, so the table is total.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            200..=299 => return None,
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::AuthExpired,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            422 => ErrorKind::Validation,
            429 => ErrorKind::RateLimited,
            500 => ErrorKind::ServerError,
            502..=504 => ErrorKind::ServiceUnavailable,
            402..=499 => ErrorKind::BadRequest,
            _ => ErrorKind::ServerError,
        };
        Some(kind)
    }

    /// Stable snake_case name, used in logs and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NetworkUnavailable => "network_unavailable",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::AuthExpired => "auth_expired",
            ErrorKind::SessionTerminated => "session_terminated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerError => "server_error",
            ErrorKind::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Generic user-facing message for this kind.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::NetworkUnavailable => {
                "Unable to reach the server. Check your connection."
            }
            ErrorKind::BadRequest => "The request could not be processed.",
            ErrorKind::AuthExpired | ErrorKind::SessionTerminated => {
                "Your session has ended. Please log in again."
            }
            ErrorKind::Forbidden => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Validation => "Some fields are invalid.",
            ErrorKind::RateLimited => "Too many requests. Please slow down.",
            ErrorKind::ServerError => "Something went wrong on the server.",
            ErrorKind::ServiceUnavailable => {
                "The service is temporarily unavailable. Try again later."
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified error type for client operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No response was received (connection, DNS, TLS, timeout).
    #[error("network unavailable: {0}")]
    NetworkUnavailable(#[from] TransportError),

    /// The server rejected the request.
    #[error("bad request (HTTP {status}){}", detail(.message))]
    BadRequest {
        status: u16,
        message: Option<String>,
    },

    /// The session is gone and the user must log in again.
    #[error("session terminated: {reason}")]
    SessionTerminated { reason: TerminationReason },

    /// The credential is valid but lacks permission.
    #[error("forbidden{}", detail(.message))]
    Forbidden { message: Option<String> },

    /// The resource does not exist.
    #[error("not found{}", detail(.message))]
    NotFound { message: Option<String> },

    /// Structured validation failure with per-field messages.
    #[error("validation failed: {}", describe_fields(.fields, .message))]
    Validation {
        fields: Vec<FieldError>,
        message: Option<String>,
    },

    /// Too many requests.
    #[error("rate limited{}", detail(.message))]
    RateLimited {
        retry_after: Option<Duration>,
        message: Option<String>,
    },

    /// The server failed, or answered with something unusable.
    #[error("server error (HTTP {status}){}", detail(.message))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    /// The server or a gateway in front of it is unavailable.
    #[error("service unavailable (HTTP {status}){}", detail(.message))]
    ServiceUnavailable {
        status: u16,
        message: Option<String>,
    },

    /// Login was attempted while a renewal is in flight.
    #[error("a session renewal is in progress")]
    RenewalInProgress,

    /// Input validation errors (URLs, scope ids, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Session persistence failed.
    #[error("session storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// The taxonomy kind of this error, or `None` for local errors that did
    /// not come from a request.
    pub fn kind(&self) -> Option<ErrorKind> {
        let kind = match self {
            Error::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            Error::BadRequest { .. } => ErrorKind::BadRequest,
            Error::SessionTerminated { .. } => ErrorKind::SessionTerminated,
            Error::Forbidden { .. } => ErrorKind::Forbidden,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::ServerError { .. } => ErrorKind::ServerError,
            Error::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Error::RenewalInProgress | Error::InvalidInput(_) | Error::Storage { .. } => {
                return None;
            }
        };
        Some(kind)
    }

    /// Returns the termination reason if this error ended the session.
    pub fn termination_reason(&self) -> Option<&TerminationReason> {
        match self {
            Error::SessionTerminated { reason } => Some(reason),
            _ => None,
        }
    }

    /// Server-provided message, when one was returned.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message, .. }
            | Error::Forbidden { message }
            | Error::NotFound { message }
            | Error::Validation { message, .. }
            | Error::RateLimited { message, .. }
            | Error::ServerError { message, .. }
            | Error::ServiceUnavailable { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for [`Error::SessionTerminated`].
    pub fn session_terminated(reason: TerminationReason) -> Self {
        Error::SessionTerminated { reason }
    }
}

/// Why a session was torn down.
///
/// Callers use this to tell an explicit logout apart from a failed renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The user logged out.
    LoggedOut,
    /// There is no credential to renew.
    NotAuthenticated,
    /// The refresh endpoint rejected the refresh token.
    RenewalRejected { status: u16 },
    /// The refresh endpoint could not be reached or answered garbage.
    RenewalUnreachable { message: String },
    /// A request was rejected again after being replayed with a renewed token.
    ReplayRejected,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::LoggedOut => write!(f, "logged out"),
            TerminationReason::NotAuthenticated => write!(f, "not authenticated"),
            TerminationReason::RenewalRejected { status } => {
                write!(f, "token renewal rejected (HTTP {status})")
            }
            TerminationReason::RenewalUnreachable { message } => {
                write!(f, "token renewal failed: {message}")
            }
            TerminationReason::ReplayRejected => {
                write!(f, "request rejected after token renewal")
            }
        }
    }
}

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `email` or `items.0.amount`).
    pub field: String,
    /// Human-readable message for that field.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Transport-level errors: the request never produced a response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other failure while sending or reading the response.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid scope (company) id.
    #[error("invalid scope id '{value}': {reason}")]
    ScopeId { value: String, reason: String },

    /// A value could not be used as an HTTP header.
    #[error("invalid value for header {name}")]
    Header { name: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

fn describe_fields(fields: &[FieldError], message: &Option<String>) -> String {
    if fields.is_empty() {
        return message.clone().unwrap_or_else(|| "no details".to_string());
    }
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
