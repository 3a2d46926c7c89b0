//! Scheduler ACL bootstrap as a single call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::AclBootstrapSettings;
use crate::errors::Result;
use crate::scheduler::{AclBootstrapper, SchedulerClient, SchedulerClientConfig};
use crate::secrets::{ParameterStore, SecretStore};

/// What the handler returns once the scheduler is bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclBootstrapReport {
    pub status_code: &'static str,
    /// False when the cluster had been bootstrapped before this run
    pub bootstrapped: bool,
    pub completed_at: DateTime<Utc>,
}

/// Trust the CA chain from the secret store, then run [`AclBootstrapper`].
pub async fn bootstrap_acl(
    settings: AclBootstrapSettings,
    secrets: Arc<dyn SecretStore>,
    parameters: Arc<dyn ParameterStore>,
) -> Result<AclBootstrapReport> {
    settings.validate()?;

    let ca_certificate = secrets.get(&settings.ca_certificate_secret).await?;
    let client = SchedulerClient::new(SchedulerClientConfig {
        address: settings.scheduler_address.clone(),
        ca_certificate_pem: Some(ca_certificate),
        timeout: settings.request_timeout,
    })?;
    info!(scheduler = %client.base_url(), "Bootstrapping scheduler ACLs");

    let outcome = AclBootstrapper::new(client, secrets, parameters, settings).run().await?;

    Ok(AclBootstrapReport {
        status_code: "OK",
        bootstrapped: outcome.is_new(),
        completed_at: Utc::now(),
    })
}
