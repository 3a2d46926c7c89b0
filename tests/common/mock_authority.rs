//! In-process certificate authority with scripted behaviour.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use pki_bootstrap::certificates::{
    CertificateAuthority, CertificateStatus, IssuedCertificate, SigningAlgorithm, ValidityPeriod,
};
use pki_bootstrap::errors::NotFoundReason;
use pki_bootstrap::{Error, Result};

use super::TEST_AUTHORITY_ARN;

pub const LEAF_PEM: &str = "-----BEGIN CERTIFICATE-----\nTEFBRg==\n-----END CERTIFICATE-----";
pub const CHAIN_PEM: &str = "-----BEGIN CERTIFICATE-----\nUk9PVA==\n-----END CERTIFICATE-----";

/// Reports `Pending` for the first `pending_checks` status checks and
/// `Issued` afterwards. `None` never issues.
#[derive(Debug)]
pub struct MockAuthority {
    pending_checks: Option<u32>,
    unreachable: bool,
    status_checks: AtomicU32,
    submitted: Mutex<Vec<(String, ValidityPeriod)>>,
}

impl MockAuthority {
    pub fn issuing_after(pending_checks: u32) -> Self {
        Self {
            pending_checks: Some(pending_checks),
            unreachable: false,
            status_checks: AtomicU32::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn never_issuing() -> Self {
        Self { pending_checks: None, ..Self::issuing_after(0) }
    }

    /// Every submit fails at the transport level.
    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::issuing_after(0) }
    }

    pub fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }

    /// CSR PEMs and validities received by `issue`, in order.
    pub fn submitted(&self) -> Vec<(String, ValidityPeriod)> {
        self.submitted.lock().unwrap().clone()
    }

    fn is_known(&self, certificate_id: &str) -> bool {
        let submitted = self.submitted.lock().unwrap().len();
        (1..=submitted).any(|n| certificate_id == format!("{TEST_AUTHORITY_ARN}/certificate/{n}"))
    }

    fn is_issued(&self) -> bool {
        matches!(self.pending_checks, Some(n) if self.status_checks() > n)
    }
}

#[async_trait]
impl CertificateAuthority for MockAuthority {
    fn authority_ref(&self) -> &str {
        TEST_AUTHORITY_ARN
    }

    async fn issue(
        &self,
        csr_pem: &str,
        _algorithm: SigningAlgorithm,
        validity: ValidityPeriod,
    ) -> Result<String> {
        if self.unreachable {
            return Err(Error::authority_unreachable(TEST_AUTHORITY_ARN, "connection refused"));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((csr_pem.to_string(), validity));
        Ok(format!("{}/certificate/{}", TEST_AUTHORITY_ARN, submitted.len()))
    }

    async fn get_status(&self, _certificate_id: &str) -> Result<CertificateStatus> {
        self.status_checks.fetch_add(1, Ordering::SeqCst);
        if self.is_issued() {
            Ok(CertificateStatus::Issued)
        } else {
            Ok(CertificateStatus::Pending)
        }
    }

    async fn get_certificate(&self, certificate_id: &str) -> Result<IssuedCertificate> {
        if !self.is_known(certificate_id) {
            return Err(Error::certificate_not_found(certificate_id, NotFoundReason::UnknownHandle));
        }
        if !self.is_issued() {
            return Err(Error::certificate_not_found(certificate_id, NotFoundReason::NotYetIssued));
        }
        Ok(IssuedCertificate { certificate: LEAF_PEM.to_string(), chain: CHAIN_PEM.to_string() })
    }
}
