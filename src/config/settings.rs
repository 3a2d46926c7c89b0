//! # Configuration Settings
//!
//! Settings for the issuance and ACL bootstrap workflows. Each struct can
//! be built from the process environment and validated with `validator`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::certificates::{PollConfig, RequestPolicy};
use crate::errors::{Error, Result};
use crate::scheduler::RetryConfig;
use crate::secrets::SecretString;

/// Prefix of every issuance environment variable.
pub const ENV_PREFIX: &str = "PKI_BOOTSTRAP_";

/// Issuance workflow settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssuanceSettings {
    /// Seconds between certificate status checks
    #[validate(range(min = 1, max = 300, message = "Poll interval must be between 1 and 300 seconds"))]
    pub poll_interval_seconds: u64,

    /// Maximum number of certificate status checks
    #[validate(range(min = 1, max = 1000, message = "Max poll attempts must be between 1 and 1000"))]
    pub max_poll_attempts: u32,

    /// Optional bound on the total poll time
    #[validate(range(min = 1, message = "Poll deadline must be at least 1 second"))]
    pub poll_deadline_seconds: Option<u64>,

    /// Directory for the filesystem sink
    pub output_dir: PathBuf,

    /// Append `localhost` / `127.0.0.1` to every request's SANs
    pub loopback_sans: bool,

    /// Validity of robot certificates, in years
    #[validate(range(min = 1, max = 10, message = "Robot validity must be between 1 and 10 years"))]
    pub robot_validity_years: u32,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 3,
            max_poll_attempts: 60,
            poll_deadline_seconds: None,
            output_dir: PathBuf::from("./generated"),
            loopback_sans: false,
            robot_validity_years: 5,
        }
    }
}

impl IssuanceSettings {
    /// Read `PKI_BOOTSTRAP_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let defaults = Self::default();

        let settings = Self {
            poll_interval_seconds: parse_or(
                var("POLL_INTERVAL_SECONDS"),
                defaults.poll_interval_seconds,
                "POLL_INTERVAL_SECONDS",
            )?,
            max_poll_attempts: parse_or(
                var("MAX_POLL_ATTEMPTS"),
                defaults.max_poll_attempts,
                "MAX_POLL_ATTEMPTS",
            )?,
            poll_deadline_seconds: var("POLL_DEADLINE_SECONDS")
                .map(|v| parse::<u64>(&v, "POLL_DEADLINE_SECONDS"))
                .transpose()?,
            output_dir: var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            loopback_sans: var("LOOPBACK_SANS")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.loopback_sans),
            robot_validity_years: parse_or(
                var("ROBOT_VALIDITY_YEARS"),
                defaults.robot_validity_years,
                "ROBOT_VALIDITY_YEARS",
            )?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_seconds),
            max_attempts: self.max_poll_attempts,
            deadline: self.poll_deadline_seconds.map(Duration::from_secs),
        }
    }

    pub fn request_policy(&self) -> RequestPolicy {
        let policy = RequestPolicy::default();
        if self.loopback_sans {
            policy.with_loopback_defaults()
        } else {
            policy
        }
    }
}

/// Scheduler ACL bootstrap settings
#[derive(Debug, Clone, Validate)]
pub struct AclBootstrapSettings {
    /// Scheduler host name or base URL
    #[validate(length(min = 1, message = "Scheduler address cannot be empty"))]
    pub scheduler_address: String,

    #[validate(length(min = 1, message = "OIDC client id cannot be empty"))]
    pub oidc_client_id: String,

    pub oidc_client_secret: SecretString,

    #[validate(url(message = "OIDC discovery URL must be a valid URL"))]
    pub oidc_discovery_url: String,

    /// Secret holding the CA chain trusted for the scheduler's TLS
    #[validate(length(min = 1))]
    pub ca_certificate_secret: String,

    /// Secret the bootstrap token is written to
    #[validate(length(min = 1))]
    pub token_secret: String,

    /// Parameter holding the policy rules
    #[validate(length(min = 1))]
    pub policy_parameter: String,

    #[validate(length(min = 1))]
    pub policy_name: String,

    #[validate(length(min = 1))]
    pub auth_method_name: String,

    #[validate(length(min = 1))]
    pub role_name: String,

    /// OIDC scopes requested by the auth method
    pub oidc_scopes: Vec<String>,

    /// Local CLI callback allowed in addition to the scheduler UI
    pub cli_redirect_uri: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Retry policy for the bootstrap call
    pub retry: RetryConfig,
}

impl AclBootstrapSettings {
    /// Settings with the standard names and the given scheduler / OIDC identity.
    pub fn new(
        scheduler_address: impl Into<String>,
        oidc_client_id: impl Into<String>,
        oidc_client_secret: impl Into<SecretString>,
        oidc_discovery_url: impl Into<String>,
    ) -> Self {
        Self {
            scheduler_address: scheduler_address.into(),
            oidc_client_id: oidc_client_id.into(),
            oidc_client_secret: oidc_client_secret.into(),
            oidc_discovery_url: oidc_discovery_url.into(),
            ca_certificate_secret: crate::certificates::CA_CERTIFICATE_SECRET_ID.to_string(),
            token_secret: "/infrastructure/nomad/token/bootstrap".to_string(),
            policy_parameter: "/infrastructure/nomad/policies/submit-job".to_string(),
            policy_name: "submit-job".to_string(),
            auth_method_name: "oidc-auth".to_string(),
            role_name: "engineering-role".to_string(),
            oidc_scopes: vec!["aws.cognito.signin.user.admin".to_string()],
            cli_redirect_uri: "http://localhost:4649/oidc/callback".to_string(),
            request_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    /// Read `NOMAD_ADDRESS` and the `OIDC_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::config(format!("{name} must be set")))
        };

        let settings = Self::new(
            required("NOMAD_ADDRESS")?,
            required("OIDC_CLIENT_ID")?,
            required("OIDC_CLIENT_SECRET")?,
            required("OIDC_DISCOVERY_URL")?,
        );
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        if self.retry.max_attempts == 0 {
            return Err(Error::config("Bootstrap retry needs at least one attempt"));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(value: &str, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {ENV_PREFIX}{name} '{value}': {e}")))
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.map(|v| parse(&v, name)).transpose().map(|v| v.unwrap_or(default))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_issuance_defaults() {
        let settings = IssuanceSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.poll_interval_seconds, 3);
        assert_eq!(settings.max_poll_attempts, 60);
        assert_eq!(settings.output_dir, PathBuf::from("./generated"));
        assert!(!settings.loopback_sans);
        assert!(settings.request_policy().default_sans.is_empty());
        assert_eq!(settings.poll_config(), PollConfig::default());
    }

    #[test]
    fn test_issuance_overrides() {
        let settings = IssuanceSettings::from_lookup(lookup(&[
            ("PKI_BOOTSTRAP_POLL_INTERVAL_SECONDS", "5"),
            ("PKI_BOOTSTRAP_MAX_POLL_ATTEMPTS", "10"),
            ("PKI_BOOTSTRAP_POLL_DEADLINE_SECONDS", "40"),
            ("PKI_BOOTSTRAP_OUTPUT_DIR", "/var/lib/robots"),
            ("PKI_BOOTSTRAP_LOOPBACK_SANS", "true"),
        ]))
        .unwrap();

        let poll = settings.poll_config();
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.max_attempts, 10);
        assert_eq!(poll.deadline, Some(Duration::from_secs(40)));
        assert_eq!(settings.output_dir, PathBuf::from("/var/lib/robots"));
        assert_eq!(settings.request_policy().default_sans.len(), 2);
    }

    #[test]
    fn test_issuance_rejects_out_of_range() {
        let err = IssuanceSettings::from_lookup(lookup(&[("PKI_BOOTSTRAP_POLL_INTERVAL_SECONDS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("Poll interval"));

        let err = IssuanceSettings::from_lookup(lookup(&[("PKI_BOOTSTRAP_MAX_POLL_ATTEMPTS", "many")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_acl_settings_from_env_vars() {
        let settings = AclBootstrapSettings::from_lookup(lookup(&[
            ("NOMAD_ADDRESS", "nomad.internal"),
            ("OIDC_CLIENT_ID", "client-123"),
            ("OIDC_CLIENT_SECRET", "very-secret"),
            ("OIDC_DISCOVERY_URL", "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_abc"),
        ]))
        .unwrap();

        assert_eq!(settings.token_secret, "/infrastructure/nomad/token/bootstrap");
        assert_eq!(settings.policy_parameter, "/infrastructure/nomad/policies/submit-job");
        assert_eq!(settings.ca_certificate_secret, "ca-caCertificate");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert!(!format!("{:?}", settings).contains("very-secret"));
    }

    #[test]
    fn test_acl_settings_require_variables() {
        let err = AclBootstrapSettings::from_lookup(lookup(&[("NOMAD_ADDRESS", "nomad.internal")]))
            .unwrap_err();
        assert!(err.to_string().contains("OIDC_CLIENT_ID"));

        let err = AclBootstrapSettings::from_lookup(lookup(&[
            ("NOMAD_ADDRESS", "nomad.internal"),
            ("OIDC_CLIENT_ID", "client"),
            ("OIDC_CLIENT_SECRET", "secret"),
            ("OIDC_DISCOVERY_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("discovery URL"));
    }
}
