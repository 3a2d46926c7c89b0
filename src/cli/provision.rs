//! Robot client certificate provisioning.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::certificates::{
    CertificateIssuer, FilesystemSink, IdentityDescriptor, SubjectAltName, ValidityPeriod,
    WrittenFiles,
};
use crate::config::IssuanceSettings;

/// Descriptor for a robot: the label is the common name, the serial number
/// is random and the only SAN is the region's scheduler client name.
pub fn robot_descriptor(label: &str, region: &str, settings: &IssuanceSettings) -> IdentityDescriptor {
    IdentityDescriptor::new(label, ValidityPeriod::years(settings.robot_validity_years))
        .with_serial_number(Uuid::new_v4().to_string())
        .with_san(SubjectAltName::dns(format!("client.{region}.nomad")))
}

/// Issue a robot certificate and write `{label}-key.pem` / `{label}.pem`
/// into the configured output directory.
pub async fn provision_robot(
    issuer: &CertificateIssuer,
    label: &str,
    region: &str,
    settings: &IssuanceSettings,
    cancel: &CancellationToken,
) -> crate::Result<WrittenFiles> {
    let descriptor = robot_descriptor(label, region, settings);
    let sink = FilesystemSink::new(settings.output_dir.clone());
    issuer.issue(label, &descriptor, &sink, cancel).await
}

#[cfg(feature = "aws")]
pub(crate) async fn handle_provision(
    label: &str,
    profile: &str,
    authority: &str,
    region: &str,
    settings: &IssuanceSettings,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    use std::sync::Arc;

    use crate::certificates::{AcmPcaAuthority, CaClient, KeyAndRequestBuilder};

    let sdk = crate::aws::load_sdk_config(Some(profile), Some(region)).await;
    let issuer = CertificateIssuer::new(
        KeyAndRequestBuilder::new(settings.request_policy()),
        CaClient::new(Arc::new(AcmPcaAuthority::new(&sdk, authority))),
        settings.poll_config(),
    );

    let files = provision_robot(&issuer, label, region, settings, cancel).await?;
    println!("Private key: {}", files.private_key.display());
    println!("Certificate: {}", files.certificate.display());
    Ok(())
}

#[cfg(not(feature = "aws"))]
pub(crate) async fn handle_provision(
    _label: &str,
    _profile: &str,
    _authority: &str,
    _region: &str,
    _settings: &IssuanceSettings,
    _cancel: &CancellationToken,
) -> anyhow::Result<()> {
    anyhow::bail!("provisioning needs AWS ACM Private CA; rebuild with `--features aws`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_descriptor() {
        let settings = IssuanceSettings::default();
        let descriptor = robot_descriptor("robot-1", "us-east-1", &settings);

        assert_eq!(descriptor.common_name(), "robot-1");
        assert_eq!(descriptor.subject_alt_names(), &[SubjectAltName::dns("client.us-east-1.nomad")]);
        assert_eq!(descriptor.validity(), ValidityPeriod::years(5));
        let serial = descriptor.serial_number().unwrap();
        assert!(Uuid::parse_str(serial).is_ok());
    }

    #[test]
    fn test_robot_serial_numbers_differ() {
        let settings = IssuanceSettings::default();
        let a = robot_descriptor("robot-1", "eu-west-1", &settings);
        let b = robot_descriptor("robot-1", "eu-west-1", &settings);
        assert_ne!(a.serial_number(), b.serial_number());
    }
}
