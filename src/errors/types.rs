//! # Error Types
//!
//! Error taxonomy for the issuance and bootstrap workflows using `thiserror`.

use std::fmt;

use crate::secrets::SecretsError;

/// Custom result type for pki-bootstrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the issuance and bootstrap workflows
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The identity descriptor cannot produce a valid signing request.
    /// Raised locally, before any network call.
    #[error("Invalid identity descriptor: {reason}")]
    InvalidIdentityDescriptor { reason: String },

    /// Key generation or CSR serialisation failed
    #[error("Key generation failed: {message}")]
    KeyGeneration { message: String },

    /// Transport-level failure talking to the certificate authority
    #[error("Certificate authority {authority} unreachable: {message}")]
    AuthorityUnreachable { authority: String, message: String },

    /// The certificate authority declined the request
    #[error("Certificate authority {authority} rejected the request: {reason}")]
    RequestRejected { authority: String, reason: String },

    /// The poll bound (attempt cap or deadline) was exceeded before issuance
    #[error("Certificate {handle} not issued after {attempts} status checks ({elapsed_ms}ms)")]
    IssuanceTimeout { handle: String, attempts: u32, elapsed_ms: u64 },

    /// The caller cancelled the poll loop
    #[error("Polling for certificate {handle} cancelled after {attempts} status checks")]
    IssuanceCancelled { handle: String, attempts: u32 },

    /// Fetch of an unknown or not-yet-issued certificate
    #[error("Certificate {handle} not found: {reason}")]
    CertificateNotFound { handle: String, reason: NotFoundReason },

    /// Secret or parameter store failure, passed through from the store
    #[error(transparent)]
    SecretStore(#[from] SecretsError),

    /// Non-2xx response (or transport failure) from the scheduler ACL API
    #[error("Scheduler API error on {endpoint}{}: {message}", .status.map(|s| format!(" (status: {s})")).unwrap_or_default())]
    SchedulerApi { endpoint: String, status: Option<u16>, message: String },

    /// An output sink could only deliver part of the material
    #[error("Failed to deliver {failed} (already delivered: {}): {reason}", describe_parts(.delivered))]
    DeliveryFailed { failed: DeliveryPart, delivered: Vec<DeliveryPart>, reason: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a fetch could not return a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The authority has no record of the handle
    UnknownHandle,
    /// The authority knows the handle but has not signed it yet
    NotYetIssued,
    /// The handle was minted by a different authority
    ForeignAuthority,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::UnknownHandle => write!(f, "unknown handle"),
            NotFoundReason::NotYetIssued => write!(f, "not yet issued"),
            NotFoundReason::ForeignAuthority => write!(f, "handle belongs to another authority"),
        }
    }
}

/// One half (or third) of the material an output sink writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPart {
    PrivateKey,
    Certificate,
    CertificateChain,
}

impl fmt::Display for DeliveryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryPart::PrivateKey => write!(f, "private key"),
            DeliveryPart::Certificate => write!(f, "certificate"),
            DeliveryPart::CertificateChain => write!(f, "certificate chain"),
        }
    }
}

fn describe_parts(parts: &[DeliveryPart]) -> String {
    if parts.is_empty() {
        return "nothing".to_string();
    }
    parts.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl Error {
    /// Create an invalid identity descriptor error
    pub fn invalid_descriptor<S: Into<String>>(reason: S) -> Self {
        Self::InvalidIdentityDescriptor { reason: reason.into() }
    }

    /// Create a key generation error
    pub fn key_generation<S: Into<String>>(message: S) -> Self {
        Self::KeyGeneration { message: message.into() }
    }

    /// Create an authority unreachable error
    pub fn authority_unreachable<A: Into<String>, M: Into<String>>(authority: A, message: M) -> Self {
        Self::AuthorityUnreachable { authority: authority.into(), message: message.into() }
    }

    /// Create a request rejected error
    pub fn request_rejected<A: Into<String>, R: Into<String>>(authority: A, reason: R) -> Self {
        Self::RequestRejected { authority: authority.into(), reason: reason.into() }
    }

    /// Create a certificate not found error
    pub fn certificate_not_found<H: Into<String>>(handle: H, reason: NotFoundReason) -> Self {
        Self::CertificateNotFound { handle: handle.into(), reason }
    }

    /// Create a scheduler API error
    pub fn scheduler_api<E: Into<String>, M: Into<String>>(
        endpoint: E,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::SchedulerApi { endpoint: endpoint.into(), status, message: message.into() }
    }

    /// Create a delivery failure
    pub fn delivery_failed<R: Into<String>>(
        failed: DeliveryPart,
        delivered: &[DeliveryPart],
        reason: R,
    ) -> Self {
        Self::DeliveryFailed { failed, delivered: delivered.to_vec(), reason: reason.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::invalid_descriptor("common name and SAN list are both empty");
        assert_eq!(
            error.to_string(),
            "Invalid identity descriptor: common name and SAN list are both empty"
        );

        let error = Error::request_rejected("arn:aws:acm-pca:ca", "MalformedCSRException");
        assert!(error.to_string().contains("rejected"));
        assert!(error.to_string().contains("MalformedCSRException"));
    }

    #[test]
    fn test_scheduler_error_status_formatting() {
        let error = Error::scheduler_api("/v1/acl/role", Some(403), "Permission denied");
        assert_eq!(
            error.to_string(),
            "Scheduler API error on /v1/acl/role (status: 403): Permission denied"
        );

        let error = Error::scheduler_api("/v1/acl/bootstrap", None, "connection refused");
        assert_eq!(error.to_string(), "Scheduler API error on /v1/acl/bootstrap: connection refused");
    }

    #[test]
    fn test_delivery_failure_names_both_halves() {
        let error = Error::delivery_failed(
            DeliveryPart::PrivateKey,
            &[DeliveryPart::Certificate],
            "disk full",
        );
        let message = error.to_string();
        assert!(message.contains("Failed to deliver private key"));
        assert!(message.contains("already delivered: certificate"));

        let error = Error::delivery_failed(DeliveryPart::Certificate, &[], "permission denied");
        assert!(error.to_string().contains("already delivered: nothing"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Serialization(_)));

        let error: Error = SecretsError::not_found("ca-caCertificate").into();
        assert!(matches!(error, Error::SecretStore(_)));
    }
}
