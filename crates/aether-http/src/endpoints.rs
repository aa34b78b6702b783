//! Authentication endpoint paths and bodies.

use serde::{Deserialize, Serialize};

/// Exchanges email and password for a token pair.
pub const LOGIN: &str = "/auth/login";

/// Exchanges a refresh token for a new token pair.
pub const REFRESH: &str = "/auth/refresh";

/// Request body for login.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for refresh.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from login and refresh. Both tokens are always present.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
