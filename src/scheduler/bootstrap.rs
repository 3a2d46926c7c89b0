//! Scheduler ACL bootstrap: obtain the management token once and register
//! the policy, OIDC auth method, role and binding rule with it.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use super::client::{BootstrapResponse, SchedulerClient};
use super::retry::is_transient;
use super::types::{AclAuthMethod, AclBindingRule, AclPolicy, AclRole, OidcConfig, PolicyLink};
use crate::config::AclBootstrapSettings;
use crate::errors::Result;
use crate::secrets::{ParameterStore, SecretStore, SecretString};

/// What the bootstrap run found.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// This run created the management token and registered the ACL objects.
    Bootstrapped { token: SecretString },
    /// ACLs were bootstrapped before; nothing was changed.
    AlreadyBootstrapped,
}

impl BootstrapOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, BootstrapOutcome::Bootstrapped { .. })
    }
}

/// Runs the bootstrap sequence against one scheduler.
pub struct AclBootstrapper {
    client: SchedulerClient,
    secrets: Arc<dyn SecretStore>,
    parameters: Arc<dyn ParameterStore>,
    settings: AclBootstrapSettings,
}

impl std::fmt::Debug for AclBootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclBootstrapper")
            .field("scheduler", &self.client.base_url())
            .field("settings", &self.settings)
            .finish()
    }
}

impl AclBootstrapper {
    pub fn new(
        client: SchedulerClient,
        secrets: Arc<dyn SecretStore>,
        parameters: Arc<dyn ParameterStore>,
        settings: AclBootstrapSettings,
    ) -> Self {
        Self { client, secrets, parameters, settings }
    }

    /// Run the whole sequence.
    ///
    /// When the scheduler reports it is already bootstrapped, no secret is
    /// written and no ACL object is registered.
    pub async fn run(&self) -> Result<BootstrapOutcome> {
        let token = match self.acquire_token().await? {
            BootstrapResponse::Token(token) => token,
            BootstrapResponse::AlreadyBootstrapped => {
                info!(scheduler = %self.client.base_url(), "Scheduler ACLs already bootstrapped");
                return Ok(BootstrapOutcome::AlreadyBootstrapped);
            }
        };

        self.secrets.put(&self.settings.token_secret, token.expose_secret()).await?;
        info!(secret = %self.settings.token_secret, "Stored bootstrap token");

        self.register_acl_objects(&token).await?;

        Ok(BootstrapOutcome::Bootstrapped { token })
    }

    /// `POST /v1/acl/bootstrap`, retrying transport errors, 5xx and 429 with
    /// backoff until the attempt budget runs out.
    async fn acquire_token(&self) -> Result<BootstrapResponse> {
        let retry = &self.settings.retry;
        let span = crate::acl_span!("bootstrap", scheduler = %self.client.base_url());

        async move {
            let mut attempt = 0;
            loop {
                if attempt > 0 {
                    let backoff = retry.backoff_for_attempt(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = retry.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying ACL bootstrap after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }

                match self.client.bootstrap().await {
                    Ok(response) => return Ok(response),
                    Err(e) if is_transient(&e) && attempt + 1 < retry.max_attempts => {
                        warn!(error = %e, attempt = attempt + 1, "Transient scheduler error, will retry");
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn register_acl_objects(&self, token: &SecretString) -> Result<()> {
        let settings = &self.settings;

        let rules = self.parameters.get(&settings.policy_parameter, false).await?;
        let policy = AclPolicy {
            name: settings.policy_name.clone(),
            description: "Default policy".to_string(),
            rules,
        };
        self.client
            .create_policy(token, &policy)
            .instrument(crate::acl_span!("register_policy", policy = %policy.name))
            .await?;
        info!(policy = %policy.name, "Registered ACL policy");

        let method = self.auth_method();
        self.client
            .create_auth_method(token, &method)
            .instrument(crate::acl_span!("register_auth_method", auth_method = %method.name))
            .await?;
        info!(auth_method = %method.name, "Registered OIDC auth method");

        let role = AclRole {
            name: settings.role_name.clone(),
            description: "Engineering role".to_string(),
            policies: vec![PolicyLink { name: settings.policy_name.clone() }],
        };
        self.client
            .create_role(token, &role)
            .instrument(crate::acl_span!("register_role", role = %role.name))
            .await?;
        info!(role = %role.name, "Registered ACL role");

        let rule = AclBindingRule {
            description: format!("{}-acl-binding-rule", settings.auth_method_name),
            auth_method: settings.auth_method_name.clone(),
            bind_type: "role".to_string(),
            bind_name: settings.role_name.clone(),
            selector: None,
        };
        self.client
            .create_binding_rule(token, &rule)
            .instrument(crate::acl_span!("register_binding_rule", auth_method = %rule.auth_method))
            .await?;
        info!(auth_method = %rule.auth_method, role = %rule.bind_name, "Registered binding rule");

        Ok(())
    }

    fn auth_method(&self) -> AclAuthMethod {
        let settings = &self.settings;
        AclAuthMethod {
            name: settings.auth_method_name.clone(),
            method_type: "OIDC".to_string(),
            token_locality: "local".to_string(),
            max_token_ttl: "1h0m0s".to_string(),
            default: true,
            config: OidcConfig {
                discovery_url: settings.oidc_discovery_url.clone(),
                client_id: settings.oidc_client_id.clone(),
                client_secret: settings.oidc_client_secret.clone(),
                scopes: settings.oidc_scopes.clone(),
                bound_audiences: vec![settings.oidc_client_id.clone()],
                allowed_redirect_uris: vec![
                    format!("{}/ui/settings/tokens", self.client.base_url()),
                    settings.cli_redirect_uri.clone(),
                ],
                claim_mappings: BTreeMap::from([("username".to_string(), "username".to_string())]),
                list_claim_mappings: BTreeMap::from([(
                    "cognito:groups".to_string(),
                    "roles".to_string(),
                )]),
            },
        }
    }
}
