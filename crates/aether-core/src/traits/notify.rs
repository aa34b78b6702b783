//! User-facing notification trait.

use crate::error::{Error, ErrorKind, FieldError, TerminationReason};

/// Something the UI layer should tell the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A request failed and the failure was returned to its caller.
    RequestFailed {
        kind: ErrorKind,
        /// Server-provided message, when the kind displays one.
        message: Option<String>,
        /// Per-field messages for validation failures.
        fields: Vec<FieldError>,
        /// Trace id of the failed attempt, if it reached the wire.
        trace_id: Option<String>,
    },
    /// The session was torn down; the user must log in again.
    SessionTerminated { reason: TerminationReason },
}

impl Notice {
    /// Build the notice for a failed request.
    ///
    /// Returns `None` for errors that are reported elsewhere (session
    /// teardown is announced once by the client, not per request) and for
    /// local errors that never reached the API.
    pub fn for_error(error: &Error, trace_id: Option<&str>) -> Option<Self> {
        let kind = error.kind()?;
        if kind == ErrorKind::SessionTerminated {
            return None;
        }

        let fields = match error {
            Error::Validation { fields, .. } => fields.clone(),
            _ => Vec::new(),
        };

        Some(Notice::RequestFailed {
            kind,
            message: error.server_message().map(str::to_string),
            fields,
            trace_id: trace_id.map(str::to_string),
        })
    }

    /// The text to show the user.
    ///
    /// Bad requests show the server's message; everything else uses the
    /// generic message for its kind.
    pub fn user_message(&self) -> String {
        match self {
            Notice::RequestFailed {
                kind: ErrorKind::BadRequest,
                message: Some(message),
                ..
            } => message.clone(),
            Notice::RequestFailed { kind, .. } => kind.user_message().to_string(),
            Notice::SessionTerminated { reason } => match reason {
                TerminationReason::LoggedOut => "You have been logged out.".to_string(),
                _ => ErrorKind::SessionTerminated.user_message().to_string(),
            },
        }
    }
}

/// Receives notices from the client.
///
/// Implementations must return quickly and never block: notices are sent
/// inline from the request path.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}
