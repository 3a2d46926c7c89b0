//! End-to-end issuance: key + CSR, submit, poll, fetch, deliver.

use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use super::client::{CaClient, PollConfig};
use super::identity::IdentityDescriptor;
use super::request::KeyAndRequestBuilder;
use super::sink::OutputSink;
use crate::errors::{Error, Result};

/// Produces one fresh key pair and CA-signed certificate per call.
#[derive(Debug, Clone)]
pub struct CertificateIssuer {
    builder: KeyAndRequestBuilder,
    client: CaClient,
    poll: PollConfig,
}

impl CertificateIssuer {
    pub fn new(builder: KeyAndRequestBuilder, client: CaClient, poll: PollConfig) -> Self {
        Self { builder, client, poll }
    }

    /// Run the whole workflow for `descriptor` and hand the result to `sink`
    /// under `label`.
    ///
    /// The sink vets `label` before any key is generated. Nothing is retried
    /// except `Pending` status checks; the first error from any step is
    /// returned.
    pub async fn issue<S>(
        &self,
        label: &str,
        descriptor: &IdentityDescriptor,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<S::Output>
    where
        S: OutputSink + ?Sized,
    {
        let span = crate::issuance_span!(label, authority = %self.client.authority_ref());
        async move {
            sink.check_label(label)?;
            let started = Instant::now();

            let builder = self.builder.clone();
            let owned = descriptor.clone();
            let (key_pair, request) = tokio::task::spawn_blocking(move || builder.generate(&owned))
                .await
                .map_err(|e| Error::key_generation(format!("key generation task failed: {e}")))??;

            let handle = self.client.submit(&request, descriptor.validity()).await?;
            self.client.poll_until_issued(&handle, &self.poll, cancel).await?;
            let issued = self.client.fetch(handle).await?;
            let output = sink.deliver(label, key_pair, issued).await?;

            info!(elapsed_ms = started.elapsed().as_millis() as u64, "Certificate issuance complete");
            Ok(output)
        }
        .instrument(span)
        .await
    }
}
