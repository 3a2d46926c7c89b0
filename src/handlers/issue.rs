//! Request/response issuance: one event in, one [`CertificateBundle`] out.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::certificates::{
    CaClient, CertificateAuthority, CertificateBundle, CertificateIssuer, IdentityDescriptor,
    IssuedCertificate, KeyAndRequestBuilder, KeyPair, OutputSink, PollConfig, SecretStoreSink,
    StructuredResultSink, SubjectAltName, ValidityPeriod,
};
use crate::config::IssuanceSettings;
use crate::errors::{Error, Result};
use crate::secrets::SecretStore;

/// Input of the certificate request handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestEvent {
    /// Reference of the authority that signs the request
    pub acm_pca_arn: String,
    pub common_name: String,
    /// Added to the SAN list after the common name
    #[serde(default)]
    pub subject_alternative_name: Option<String>,
    pub expiry_days: u32,
    /// Prefix of the returned secret ids
    pub secret_prefix: String,
}

impl CertificateRequestEvent {
    /// The common name is always a DNS SAN too, followed by the extra name
    /// when it differs.
    pub fn descriptor(&self) -> Result<IdentityDescriptor> {
        if self.secret_prefix.trim().is_empty() {
            return Err(Error::invalid_descriptor("secretPrefix cannot be empty"));
        }

        let mut descriptor =
            IdentityDescriptor::new(self.common_name.clone(), ValidityPeriod::days(self.expiry_days));
        if !self.common_name.is_empty() {
            descriptor = descriptor.with_san(SubjectAltName::dns(self.common_name.clone()));
        }
        if let Some(san) = self.subject_alternative_name.as_deref().map(str::trim) {
            if !san.is_empty() && san != self.common_name {
                let name = san
                    .parse::<IpAddr>()
                    .map(SubjectAltName::Ip)
                    .unwrap_or_else(|_| SubjectAltName::dns(san));
                descriptor = descriptor.with_san(name);
            }
        }

        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Builds the authority client for an event's authority reference.
pub type AuthorityFactory = Arc<dyn Fn(&str) -> Arc<dyn CertificateAuthority> + Send + Sync>;

/// Issues one certificate per event.
///
/// The bundle is always returned to the caller. With a secret store
/// attached, the material is also persisted under the bundle's secret ids
/// before it is returned.
#[derive(Clone)]
pub struct CertificateRequestHandler {
    authorities: AuthorityFactory,
    builder: KeyAndRequestBuilder,
    poll: PollConfig,
    persist: Option<SecretStoreSink>,
}

impl fmt::Debug for CertificateRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRequestHandler")
            .field("builder", &self.builder)
            .field("poll", &self.poll)
            .field("persist", &self.persist.is_some())
            .finish()
    }
}

impl CertificateRequestHandler {
    pub fn new<F>(authorities: F, settings: &IssuanceSettings) -> Self
    where
        F: Fn(&str) -> Arc<dyn CertificateAuthority> + Send + Sync + 'static,
    {
        Self {
            authorities: Arc::new(authorities),
            builder: KeyAndRequestBuilder::new(settings.request_policy()),
            poll: settings.poll_config(),
            persist: None,
        }
    }

    pub fn with_secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.persist = Some(SecretStoreSink::new(store));
        self
    }

    pub async fn handle(
        &self,
        event: CertificateRequestEvent,
        cancel: &CancellationToken,
    ) -> Result<CertificateBundle> {
        if event.acm_pca_arn.trim().is_empty() {
            return Err(Error::config("acmPcaArn cannot be empty"));
        }
        let descriptor = event.descriptor()?;

        let authority = (self.authorities)(&event.acm_pca_arn);
        let issuer =
            CertificateIssuer::new(self.builder.clone(), CaClient::new(authority), self.poll);

        let sink = BundleSink { persist: self.persist.as_ref() };
        let bundle = issuer.issue(&event.secret_prefix, &descriptor, &sink, cancel).await?;

        info!(
            common_name = %event.common_name,
            certificate_secret = %bundle.certificate_secret_id,
            persisted = self.persist.is_some(),
            "Certificate request handled"
        );
        Ok(bundle)
    }
}

struct BundleSink<'a> {
    persist: Option<&'a SecretStoreSink>,
}

#[async_trait]
impl OutputSink for BundleSink<'_> {
    type Output = CertificateBundle;

    async fn deliver(
        &self,
        label: &str,
        key_pair: KeyPair,
        certificate: IssuedCertificate,
    ) -> Result<CertificateBundle> {
        if let Some(store) = self.persist {
            store.store(label, key_pair.private_key_pem(), &certificate).await?;
        }
        StructuredResultSink.deliver(label, key_pair, certificate).await
    }
}
