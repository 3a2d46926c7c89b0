//! Destinations for issued key material.
//!
//! A sink takes ownership of the [`KeyPair`] and the [`IssuedCertificate`]
//! at the end of an issuance. Sinks that write more than one item report
//! partial failure as [`Error::DeliveryFailed`](crate::Error::DeliveryFailed),
//! naming the item that failed and the items already written.

use async_trait::async_trait;

use super::authority::IssuedCertificate;
use super::request::KeyPair;
use crate::errors::Result;

mod filesystem;
mod secret_store;
mod structured;

pub use filesystem::{FilesystemSink, WrittenFiles};
pub use secret_store::{SecretStoreSink, StoredSecrets};
pub use structured::{CertificateBundle, StructuredResultSink};

/// Secret id under which the CA chain is stored.
pub const CA_CERTIFICATE_SECRET_ID: &str = "ca-caCertificate";

/// Final step of an issuance.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// What the caller gets back once delivery succeeds.
    type Output: Send;

    /// Reject a label this sink could never deliver under. Called before
    /// any key is generated or request submitted.
    fn check_label(&self, _label: &str) -> Result<()> {
        Ok(())
    }

    /// Hand over the key pair and certificate. `label` names the identity
    /// (a file stem, or a secret id prefix).
    async fn deliver(
        &self,
        label: &str,
        key_pair: KeyPair,
        certificate: IssuedCertificate,
    ) -> Result<Self::Output>;
}

/// Secret ids derived from a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretNaming {
    prefix: String,
}

impl SecretNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn private_key_id(&self) -> String {
        format!("{}-PrivateKey", self.prefix)
    }

    pub fn certificate_id(&self) -> String {
        format!("{}-Certificate", self.prefix)
    }

    pub fn ca_certificate_id(&self) -> &'static str {
        CA_CERTIFICATE_SECRET_ID
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::certificates::identity::{IdentityDescriptor, ValidityPeriod};
    use crate::certificates::request::KeyAndRequestBuilder;

    pub fn key_pair() -> KeyPair {
        let descriptor = IdentityDescriptor::new("sink-test", ValidityPeriod::days(1));
        KeyAndRequestBuilder::default().generate(&descriptor).unwrap().0
    }

    pub fn issued() -> IssuedCertificate {
        IssuedCertificate {
            certificate: "-----BEGIN CERTIFICATE-----\nLEAF\n-----END CERTIFICATE-----".into(),
            chain: "-----BEGIN CERTIFICATE-----\nROOT\n-----END CERTIFICATE-----".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_naming() {
        let naming = SecretNaming::new("nomad-server");
        assert_eq!(naming.private_key_id(), "nomad-server-PrivateKey");
        assert_eq!(naming.certificate_id(), "nomad-server-Certificate");
        assert_eq!(naming.ca_certificate_id(), "ca-caCertificate");
    }
}
