//! Validated value types.
//!
//! These types enforce their invariants at construction time, so a value
//! that exists can always be put on the wire.

mod api_url;
mod scope_id;

pub use api_url::ApiUrl;
pub use scope_id::ScopeId;
