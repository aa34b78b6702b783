//! Traits implemented by the client's collaborators.

mod notify;
mod storage;

pub use notify::{Notice, NotificationSink};
pub use storage::{PersistedSession, SessionStorage};
