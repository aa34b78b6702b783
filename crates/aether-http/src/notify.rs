//! Built-in notification sinks.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use aether_core::{Notice, NotificationSink};

/// Logs every notice as a warning.
///
/// Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::RequestFailed { kind, trace_id, .. } => {
                warn!(
                    kind = %kind,
                    trace_id = trace_id.as_deref().unwrap_or("-"),
                    "{}",
                    notice.user_message()
                );
            }
            Notice::SessionTerminated { reason } => {
                warn!(%reason, "{}", notice.user_message());
            }
        }
    }
}

/// Keeps every notice it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    /// Returns a copy of the notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
