//! # Certificate Issuance
//!
//! Issuing a certificate from a private CA is a fixed sequence:
//!
//! 1. [`KeyAndRequestBuilder`] generates an RSA key pair and a CSR for an
//!    [`IdentityDescriptor`]
//! 2. [`CaClient::submit`] sends the CSR to the [`CertificateAuthority`]
//! 3. [`CaClient::poll_until_issued`] waits for the signature
//! 4. [`CaClient::fetch`] retrieves certificate and chain
//! 5. an [`OutputSink`] takes ownership of the key and certificate
//!
//! [`CertificateIssuer`] runs the whole sequence.
//!
//! ```rust,ignore
//! use pki_bootstrap::certificates::*;
//!
//! let issuer = CertificateIssuer::new(
//!     KeyAndRequestBuilder::default(),
//!     CaClient::new(authority),
//!     PollConfig::default(),
//! );
//! let descriptor = IdentityDescriptor::new("robot-1", ValidityPeriod::years(5))
//!     .with_san(SubjectAltName::dns("client.us-east-1.nomad"));
//! let files = issuer
//!     .issue("robot-1", &descriptor, &FilesystemSink::new("generated"), &cancel)
//!     .await?;
//! ```

#[cfg(feature = "aws")]
pub mod acm_pca;
pub mod authority;
pub mod client;
pub mod identity;
pub mod issuer;
pub mod request;
pub mod sink;

#[cfg(feature = "aws")]
pub use acm_pca::AcmPcaAuthority;
pub use authority::{
    CertificateAuthority, CertificateHandle, CertificateStatus, IssuedCertificate, SigningAlgorithm,
};
pub use client::{CaClient, PollConfig, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use identity::{IdentityDescriptor, SubjectAltName, ValidityPeriod, ValidityUnit};
pub use issuer::CertificateIssuer;
pub use request::{
    KeyAndRequestBuilder, KeyPair, KeyPolicy, RequestPolicy, SigningRequest, RSA_KEY_BITS,
    RSA_PUBLIC_EXPONENT,
};
pub use sink::{
    CertificateBundle, FilesystemSink, OutputSink, SecretNaming, SecretStoreSink, StoredSecrets,
    StructuredResultSink, WrittenFiles, CA_CERTIFICATE_SECRET_ID,
};
