//! aether-http - Resilient HTTP client for the Aether API.
//!
//! All requests flow through an [`ApiClient`]. It attaches the session's
//! bearer token and active company, classifies every response into the
//! closed [`Error`] taxonomy, and renews an expired access token exactly once
//! no matter how many requests notice the expiry at the same time.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use aether_core::{ApiUrl, Credentials};
//! use aether_http::{ApiClient, ClientConfig, MemoryStorage, RequestDescriptor};
//!
//! # async fn example() -> aether_core::Result<()> {
//! let config = ClientConfig::new(ApiUrl::new("http://localhost:8000/api/v1")?);
//! let client = ApiClient::builder(config)
//!     .storage(Arc::new(MemoryStorage::new()))
//!     .build()
//!     .await?;
//!
//! client.login(&Credentials::new("user@example.com", "secret"), None).await?;
//!
//! let response = client
//!     .dispatch(RequestDescriptor::get("/transactions").query("limit", "10"))
//!     .await?;
//! let transactions: serde_json::Value = response.json()?;
//! println!("{transactions}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod coordinator;
mod descriptor;
mod endpoints;
mod notify;
mod storage;
mod store;
mod transport;

pub use client::{ApiClient, ApiClientBuilder, ApiResponse};
pub use config::{ClientConfig, DEFAULT_REFRESH_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
pub use coordinator::{RefreshCoordinator, SessionPhase};
pub use descriptor::{RequestDescriptor, TraceId};
pub use endpoints::{LOGIN, REFRESH};
pub use notify::{RecordingSink, TracingSink};
pub use storage::MemoryStorage;
pub use transport::{X_COMPANY_ID, X_REQUEST_ID};

pub use aether_core::{Error, Result};
pub use reqwest::Method;
