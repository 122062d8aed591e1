//! Login and registration models.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login response.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("message", &self.message)
            .finish()
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}
