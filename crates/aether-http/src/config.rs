//! Client configuration.

use std::time::Duration;

use aether_core::ApiUrl;

/// Default upper bound for an ordinary request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound for the token renewal call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for an [`ApiClient`](crate::ApiClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use aether_core::ApiUrl;
/// use aether_http::ClientConfig;
///
/// let config = ClientConfig::new(ApiUrl::new("https://api.example.com/api/v1").unwrap())
///     .request_timeout(Duration::from_secs(10));
/// assert_eq!(config.request_timeout_value(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: ApiUrl,
    request_timeout: Duration,
    refresh_timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Configuration with default timeouts for the given API base URL.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            user_agent: concat!("aether/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Upper bound for each ordinary request attempt.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Upper bound for the renewal call.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn request_timeout_value(&self) -> Duration {
        self.request_timeout
    }

    pub fn refresh_timeout_value(&self) -> Duration {
        self.refresh_timeout
    }

    pub fn user_agent_value(&self) -> &str {
        &self.user_agent
    }
}
