//! AWS ACM Private CA implementation of [`CertificateAuthority`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_acmpca::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_acmpca::primitives::Blob;
use aws_sdk_acmpca::types::{SigningAlgorithm as PcaSigningAlgorithm, Validity, ValidityPeriodType};
use tracing::debug;

use super::authority::{CertificateAuthority, CertificateStatus, IssuedCertificate, SigningAlgorithm};
use super::identity::{ValidityPeriod, ValidityUnit};
use crate::errors::{Error, NotFoundReason, Result};

/// One ACM Private CA, identified by its ARN.
#[derive(Debug, Clone)]
pub struct AcmPcaAuthority {
    client: aws_sdk_acmpca::Client,
    arn: String,
}

impl AcmPcaAuthority {
    pub fn new(config: &SdkConfig, arn: impl Into<String>) -> Self {
        Self { client: aws_sdk_acmpca::Client::new(config), arn: arn.into() }
    }
}

#[async_trait]
impl CertificateAuthority for AcmPcaAuthority {
    fn authority_ref(&self) -> &str {
        &self.arn
    }

    async fn issue(
        &self,
        csr_pem: &str,
        algorithm: SigningAlgorithm,
        validity: ValidityPeriod,
    ) -> Result<String> {
        let algorithm = match algorithm {
            SigningAlgorithm::Sha256WithRsa => PcaSigningAlgorithm::Sha256Withrsa,
        };
        let period_type = match validity.unit {
            ValidityUnit::Days => ValidityPeriodType::Days,
            ValidityUnit::Years => ValidityPeriodType::Years,
        };
        let validity = Validity::builder()
            .value(i64::from(validity.value))
            .r#type(period_type)
            .build()
            .map_err(|e| Error::invalid_descriptor(format!("invalid validity: {e}")))?;

        let output = self
            .client
            .issue_certificate()
            .certificate_authority_arn(&self.arn)
            .csr(Blob::new(csr_pem.as_bytes()))
            .signing_algorithm(algorithm)
            .validity(validity)
            .send()
            .await
            .map_err(|e| map_sdk_error(&self.arn, e))?;

        output
            .certificate_arn()
            .map(str::to_string)
            .ok_or_else(|| Error::request_rejected(&self.arn, "IssueCertificate returned no certificate ARN"))
    }

    async fn get_status(&self, certificate_id: &str) -> Result<CertificateStatus> {
        let result = self
            .client
            .get_certificate()
            .certificate_authority_arn(&self.arn)
            .certificate_arn(certificate_id)
            .send()
            .await;

        let err = match result {
            Ok(_) => return Ok(CertificateStatus::Issued),
            Err(err) => err,
        };

        if let Some(e) = err.as_service_error() {
            if e.is_request_in_progress_exception() {
                return Ok(CertificateStatus::Pending);
            }
            if e.is_request_failed_exception() {
                let reason = e.message().unwrap_or("RequestFailedException").to_string();
                return Ok(CertificateStatus::Failed(reason));
            }
            if e.is_resource_not_found_exception() {
                return Err(Error::certificate_not_found(certificate_id, NotFoundReason::UnknownHandle));
            }
        }
        Err(map_sdk_error(&self.arn, err))
    }

    async fn get_certificate(&self, certificate_id: &str) -> Result<IssuedCertificate> {
        let result = self
            .client
            .get_certificate()
            .certificate_authority_arn(&self.arn)
            .certificate_arn(certificate_id)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let reason = err.as_service_error().and_then(|e| {
                    if e.is_request_in_progress_exception() {
                        Some(NotFoundReason::NotYetIssued)
                    } else if e.is_resource_not_found_exception() {
                        Some(NotFoundReason::UnknownHandle)
                    } else {
                        None
                    }
                });
                return Err(match reason {
                    Some(reason) => Error::certificate_not_found(certificate_id, reason),
                    None => map_sdk_error(&self.arn, err),
                });
            }
        };

        let certificate = output
            .certificate()
            .ok_or_else(|| Error::certificate_not_found(certificate_id, NotFoundReason::NotYetIssued))?;
        debug!(certificate = %certificate_id, "Retrieved certificate from ACM PCA");

        Ok(IssuedCertificate {
            certificate: certificate.to_string(),
            chain: output.certificate_chain().unwrap_or_default().to_string(),
        })
    }
}

/// Service answers become `RequestRejected` with the exception code;
/// everything that never got an answer is `AuthorityUnreachable`.
fn map_sdk_error<E, R>(authority: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(_) => {
            let code = err.code().unwrap_or("Unknown");
            let message = err.message().unwrap_or_default();
            Error::request_rejected(authority, format!("{code}: {message}"))
        }
        SdkError::ConstructionFailure(_) => Error::config(DisplayErrorContext(&err).to_string()),
        _ => Error::authority_unreachable(authority, DisplayErrorContext(&err).to_string()),
    }
}
