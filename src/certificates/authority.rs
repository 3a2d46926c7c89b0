//! Certificate authority contract.

use async_trait::async_trait;
use std::fmt;

use super::identity::ValidityPeriod;
use crate::errors::Result;

/// Signing algorithm requested from the authority. Only one is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Sha256WithRsa,
}

impl SigningAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256WithRsa => "SHA256WITHRSA",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a submitted request, scoped to the authority that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateHandle {
    authority: String,
    id: String,
}

impl CertificateHandle {
    pub fn new(authority: impl Into<String>, id: impl Into<String>) -> Self {
        Self { authority: authority.into(), id: id.into() }
    }

    /// Reference of the authority that issued this handle.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The authority's identifier for the certificate (an ARN for ACM PCA).
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CertificateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// State of a submitted request as reported by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateStatus {
    Pending,
    Issued,
    Failed(String),
}

/// A signed leaf certificate and the chain that vouches for it.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub certificate: String,
    pub chain: String,
}

impl IssuedCertificate {
    /// Leaf followed by chain, as written to a single PEM bundle.
    pub fn full_chain(&self) -> String {
        format!("{}\n{}", self.certificate, self.chain)
    }
}

impl fmt::Debug for IssuedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCertificate")
            .field("certificate", &format!("[{} bytes PEM]", self.certificate.len()))
            .field("chain", &format!("[{} bytes PEM]", self.chain.len()))
            .finish()
    }
}

/// A private certificate authority instance.
///
/// Implementations map their transport failures to
/// [`Error::AuthorityUnreachable`](crate::Error::AuthorityUnreachable) and
/// explicit refusals to
/// [`Error::RequestRejected`](crate::Error::RequestRejected). They never
/// retry on their own.
#[async_trait]
pub trait CertificateAuthority: Send + Sync + fmt::Debug {
    /// Reference identifying this authority instance (an ARN for ACM PCA).
    fn authority_ref(&self) -> &str;

    /// Submit a PEM-encoded CSR and return the authority's identifier for it.
    async fn issue(
        &self,
        csr_pem: &str,
        algorithm: SigningAlgorithm,
        validity: ValidityPeriod,
    ) -> Result<String>;

    /// Current state of a previously issued request.
    async fn get_status(&self, certificate_id: &str) -> Result<CertificateStatus>;

    /// Retrieve a signed certificate.
    ///
    /// Unknown or not-yet-issued identifiers fail with
    /// [`Error::CertificateNotFound`](crate::Error::CertificateNotFound).
    async fn get_certificate(&self, certificate_id: &str) -> Result<IssuedCertificate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_algorithm_wire_name() {
        assert_eq!(SigningAlgorithm::default().as_str(), "SHA256WITHRSA");
    }

    #[test]
    fn test_full_chain_joins_with_newline() {
        let issued = IssuedCertificate { certificate: "LEAF".into(), chain: "CHAIN".into() };
        assert_eq!(issued.full_chain(), "LEAF\nCHAIN");
        assert!(!format!("{:?}", issued).contains("LEAF"));
    }

    #[test]
    fn test_handle_display_is_id() {
        let handle = CertificateHandle::new("arn:ca", "arn:ca/certificate/abc");
        assert_eq!(handle.to_string(), "arn:ca/certificate/abc");
        assert_eq!(handle.authority(), "arn:ca");
    }
}
