//! Identity descriptors: who a certificate is for and how long it lives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::errors::{Error, Result};

/// One entry of the subjectAltName extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SubjectAltName {
    Dns(String),
    Ip(IpAddr),
}

impl SubjectAltName {
    pub fn dns(name: impl Into<String>) -> Self {
        Self::Dns(name.into())
    }

    pub fn ip(addr: impl Into<IpAddr>) -> Self {
        Self::Ip(addr.into())
    }

    /// `localhost` and `127.0.0.1`, the loopback pair some deployments
    /// append to every request.
    pub fn loopback_defaults() -> Vec<SubjectAltName> {
        vec![Self::dns("localhost"), Self::ip(Ipv4Addr::LOCALHOST)]
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            SubjectAltName::Ip(_) => Ok(()),
            SubjectAltName::Dns(name) => {
                if name.is_empty() {
                    return Err(Error::invalid_descriptor("DNS subject alternative name is empty"));
                }
                // dNSName is an IA5String
                if !name.is_ascii() || name.chars().any(|c| c.is_ascii_control() || c == ' ') {
                    return Err(Error::invalid_descriptor(format!(
                        "DNS subject alternative name '{}' is not a valid IA5 host name",
                        name.escape_default()
                    )));
                }
                if name.len() > 253 {
                    return Err(Error::invalid_descriptor(format!(
                        "DNS subject alternative name '{}' exceeds 253 characters",
                        name
                    )));
                }
                Ok(())
            }
        }
    }
}

impl FromStr for SubjectAltName {
    type Err = std::convert::Infallible;

    /// Anything that parses as an IP address is an IP SAN; everything else is a DNS name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<IpAddr>() {
            Ok(addr) => SubjectAltName::Ip(addr),
            Err(_) => SubjectAltName::Dns(s.to_string()),
        })
    }
}

impl fmt::Display for SubjectAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectAltName::Dns(name) => write!(f, "DNS:{}", name),
            SubjectAltName::Ip(addr) => write!(f, "IP:{}", addr),
        }
    }
}

/// Unit of a requested validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityUnit {
    Days,
    Years,
}

impl fmt::Display for ValidityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityUnit::Days => write!(f, "days"),
            ValidityUnit::Years => write!(f, "years"),
        }
    }
}

/// Requested certificate lifetime, passed to the authority as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    pub value: u32,
    pub unit: ValidityUnit,
}

impl ValidityPeriod {
    pub fn days(value: u32) -> Self {
        Self { value, unit: ValidityUnit::Days }
    }

    pub fn years(value: u32) -> Self {
        Self { value, unit: ValidityUnit::Years }
    }
}

impl fmt::Display for ValidityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// The subject of one certificate request.
///
/// Built once per issuance and never mutated afterwards. At least one of
/// the common name and the SAN list must be non-empty; [`validate`] checks
/// that along with the shape of every SAN.
///
/// [`validate`]: IdentityDescriptor::validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDescriptor {
    common_name: String,
    subject_alt_names: Vec<SubjectAltName>,
    validity: ValidityPeriod,
    serial_number: Option<String>,
}

impl IdentityDescriptor {
    pub fn new(common_name: impl Into<String>, validity: ValidityPeriod) -> Self {
        Self {
            common_name: common_name.into(),
            subject_alt_names: Vec::new(),
            validity,
            serial_number: None,
        }
    }

    /// Append a SAN. Order is preserved in the signing request.
    pub fn with_san(mut self, san: SubjectAltName) -> Self {
        self.subject_alt_names.push(san);
        self
    }

    pub fn with_sans(mut self, sans: impl IntoIterator<Item = SubjectAltName>) -> Self {
        self.subject_alt_names.extend(sans);
        self
    }

    /// Set the subject's serialNumber attribute (OID 2.5.4.5).
    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    pub fn subject_alt_names(&self) -> &[SubjectAltName] {
        &self.subject_alt_names
    }

    pub fn validity(&self) -> ValidityPeriod {
        self.validity
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        if self.common_name.is_empty() && self.subject_alt_names.is_empty() {
            return Err(Error::invalid_descriptor(
                "common name and subject alternative names are both empty",
            ));
        }
        if self.validity.value == 0 {
            return Err(Error::invalid_descriptor("validity period must be positive"));
        }
        if let Some(serial) = &self.serial_number {
            if serial.is_empty() {
                return Err(Error::invalid_descriptor("serial number is empty"));
            }
        }
        for san in &self.subject_alt_names {
            san.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_requires_name_or_san() {
        let empty = IdentityDescriptor::new("", ValidityPeriod::days(30));
        let err = empty.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentityDescriptor { .. }));

        assert!(IdentityDescriptor::new("robot-1", ValidityPeriod::years(5)).validate().is_ok());
        assert!(IdentityDescriptor::new("", ValidityPeriod::days(1))
            .with_san(SubjectAltName::dns("client.us-east-1.nomad"))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_sans_keep_insertion_order() {
        let descriptor = IdentityDescriptor::new("server", ValidityPeriod::days(365))
            .with_san(SubjectAltName::dns("server.global.nomad"))
            .with_sans(SubjectAltName::loopback_defaults());

        assert_eq!(
            descriptor.subject_alt_names(),
            &[
                SubjectAltName::dns("server.global.nomad"),
                SubjectAltName::dns("localhost"),
                SubjectAltName::ip(Ipv4Addr::LOCALHOST),
            ]
        );
    }

    #[test]
    fn test_malformed_dns_names_rejected() {
        for bad in ["", "has space.example", "ünïcode.example", "tab\there"] {
            let descriptor = IdentityDescriptor::new("cn", ValidityPeriod::days(1))
                .with_san(SubjectAltName::dns(bad));
            assert!(descriptor.validate().is_err(), "expected '{}' to be rejected", bad);
        }
    }

    #[test]
    fn test_zero_validity_rejected() {
        let descriptor = IdentityDescriptor::new("cn", ValidityPeriod::days(0));
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_san_from_str() {
        assert_eq!("10.0.0.1".parse::<SubjectAltName>().unwrap(), SubjectAltName::ip(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!("::1".parse::<SubjectAltName>().unwrap().to_string(), "IP:::1");
        assert_eq!(
            "client.eu-west-1.nomad".parse::<SubjectAltName>().unwrap(),
            SubjectAltName::dns("client.eu-west-1.nomad")
        );
    }

    #[test]
    fn test_validity_display() {
        assert_eq!(ValidityPeriod::years(5).to_string(), "5 years");
        assert_eq!(ValidityPeriod::days(90).to_string(), "90 days");
    }
}
