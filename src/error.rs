//! Crate-level error types.
//!
//! [`TidewatchError`] unifies every error source (configuration, HTTP,
//! JSON, keychain, terminal I/O) behind a single enum so callers can match
//! on the variant they care about while still using the `?` operator for
//! easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TidewatchError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum TidewatchError {
    /// Configuration could not be read or was invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be sent or its response not read.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the server's `error` field when the body carried one,
    /// otherwise the canonical reason for the status code.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Terminal or file I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// The TLS trust store could not be built.
    #[error("tls error: {0}")]
    Tls(String),

    /// The OS keychain rejected a read or write.
    #[error("keychain error: {0}")]
    Keychain(String),
}

impl TidewatchError {
    /// Returns the HTTP status of an [`Api`](Self::Api) failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TidewatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_server_message() {
        let err = TidewatchError::Api {
            status: 400,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn non_api_errors_have_no_status() {
        let err = TidewatchError::Config("bad".to_string());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "configuration error: bad");
    }
}
