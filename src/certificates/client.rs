//! Submit / poll / fetch against one certificate authority.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::authority::{
    CertificateAuthority, CertificateHandle, CertificateStatus, IssuedCertificate, SigningAlgorithm,
};
use super::identity::ValidityPeriod;
use super::request::SigningRequest;
use crate::errors::{Error, NotFoundReason, Result};

/// Seconds between status checks unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Status checks before giving up unless configured otherwise.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Bounds for [`CaClient::poll_until_issued`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks, the first one included.
    pub max_attempts: u32,
    /// Optional wall-clock bound on the whole poll.
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, max_attempts: DEFAULT_MAX_POLL_ATTEMPTS, deadline: None }
    }
}

/// Client for a single authority instance.
///
/// Handles returned by [`submit`](CaClient::submit) carry the authority
/// reference; passing one to a client for a different authority fails with
/// [`NotFoundReason::ForeignAuthority`].
#[derive(Clone)]
pub struct CaClient {
    authority: Arc<dyn CertificateAuthority>,
}

impl fmt::Debug for CaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaClient").field("authority", &self.authority.authority_ref()).finish()
    }
}

impl CaClient {
    pub fn new(authority: Arc<dyn CertificateAuthority>) -> Self {
        Self { authority }
    }

    pub fn authority_ref(&self) -> &str {
        self.authority.authority_ref()
    }

    /// Send the CSR for signing. Not retried.
    pub async fn submit(
        &self,
        request: &SigningRequest,
        validity: ValidityPeriod,
    ) -> Result<CertificateHandle> {
        info!(
            authority = %self.authority_ref(),
            csr_sha256 = %request.fingerprint(),
            validity = %validity,
            "Submitting certificate signing request"
        );

        let id = self.authority.issue(request.pem(), SigningAlgorithm::Sha256WithRsa, validity).await?;

        info!(authority = %self.authority_ref(), certificate = %id, "Certificate request accepted");
        Ok(CertificateHandle::new(self.authority_ref(), id))
    }

    /// Wait until the authority reports the certificate as issued.
    ///
    /// The first status check happens immediately; each later one waits
    /// `config.interval`. Only `Pending` is retried. A `Failed` status becomes
    /// [`Error::RequestRejected`], and any error from the status call is
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// - [`Error::IssuanceTimeout`] after `max_attempts` pending checks, or
    ///   when the next check would fall after `deadline`
    /// - [`Error::IssuanceCancelled`] when `cancel` fires
    pub async fn poll_until_issued(
        &self,
        handle: &CertificateHandle,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.check_handle(handle)?;

        let started = Instant::now();
        let deadline = config.deadline.map(|d| started + d);
        let mut attempts: u32 = 0;

        loop {
            if attempts >= config.max_attempts {
                return Err(timeout(handle, attempts, started));
            }

            if attempts > 0 {
                let wake = Instant::now() + config.interval;
                if deadline.is_some_and(|d| wake > d) {
                    warn!(certificate = %handle, attempts, "Poll deadline reached before issuance");
                    return Err(timeout(handle, attempts, started));
                }
                tokio::select! {
                    _ = cancel.cancelled() => return Err(cancelled(handle, attempts)),
                    _ = tokio::time::sleep_until(wake) => {}
                }
            }

            if cancel.is_cancelled() {
                return Err(cancelled(handle, attempts));
            }

            attempts += 1;
            match self.authority.get_status(handle.id()).await? {
                CertificateStatus::Issued => {
                    info!(certificate = %handle, attempts, "Certificate issued");
                    return Ok(());
                }
                CertificateStatus::Failed(reason) => {
                    warn!(certificate = %handle, %reason, "Certificate request failed");
                    return Err(Error::request_rejected(self.authority_ref(), reason));
                }
                CertificateStatus::Pending => {
                    debug!(
                        certificate = %handle,
                        attempt = attempts,
                        max_attempts = config.max_attempts,
                        "Certificate still pending"
                    );
                }
            }
        }
    }

    /// Retrieve the signed certificate and chain.
    pub async fn fetch(&self, handle: CertificateHandle) -> Result<IssuedCertificate> {
        self.check_handle(&handle)?;
        let issued = self.authority.get_certificate(handle.id()).await?;
        debug!(certificate = %handle, "Fetched issued certificate");
        Ok(issued)
    }

    fn check_handle(&self, handle: &CertificateHandle) -> Result<()> {
        if handle.authority() != self.authority_ref() {
            return Err(Error::certificate_not_found(handle.id(), NotFoundReason::ForeignAuthority));
        }
        Ok(())
    }
}

fn timeout(handle: &CertificateHandle, attempts: u32, started: Instant) -> Error {
    Error::IssuanceTimeout {
        handle: handle.id().to_string(),
        attempts,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

fn cancelled(handle: &CertificateHandle, attempts: u32) -> Error {
    Error::IssuanceCancelled { handle: handle.id().to_string(), attempts }
}
