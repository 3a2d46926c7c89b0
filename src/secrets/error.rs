//! Error types for secret and parameter store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors returned by the secret store and parameter store contracts.
///
/// Remote backends report their own error code (for AWS, the exception name
/// such as `DecryptionFailure` or `ResourceNotFoundException`); it is kept
/// verbatim in [`SecretsError::Service`] so callers can branch on it.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Secret or parameter not found in the backend.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// Failed to reach the backend.
    #[error("Backend connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Invalid secret key format.
    #[error("Invalid secret key: {key} - {reason}")]
    InvalidKey { key: String, reason: String },

    /// The stored value is not usable (e.g. binary where a string is expected).
    #[error("Invalid secret value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Error reported by the service, with its error code passed through.
    #[error("{code} on '{key}': {message}")]
    Service { key: String, code: String, message: String },
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue { key: key.into(), reason: reason.into() }
    }

    /// Create a service error carrying the backend's own error code.
    pub fn service(
        key: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service { key: key.into(), code: code.into(), message: message.into() }
    }

    /// The backend error code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            SecretsError::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}
