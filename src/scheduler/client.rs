//! HTTP client for the Nomad ACL API.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

use super::types::{AclAuthMethod, AclBindingRule, AclPolicy, AclRole, BootstrapToken};
use crate::errors::{Error, Result};
use crate::secrets::SecretString;

const TOKEN_HEADER: &str = "X-Nomad-Token";
const DEFAULT_PORT: u16 = 4646;

/// Connection settings for [`SchedulerClient`].
#[derive(Debug, Clone)]
pub struct SchedulerClientConfig {
    /// Host name (`nomad.internal`) or full base URL (`https://nomad.internal:4646`)
    pub address: String,
    /// PEM bundle to trust in addition to the system roots
    pub ca_certificate_pem: Option<String>,
    pub timeout: Duration,
}

impl SchedulerClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), ca_certificate_pem: None, timeout: Duration::from_secs(5) }
    }

    /// A bare host name means HTTPS on the default Nomad port.
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.contains("://") {
            address.to_string()
        } else {
            format!("https://{}:{}", address, DEFAULT_PORT)
        }
    }
}

/// Result of the bootstrap call.
#[derive(Debug)]
pub enum BootstrapResponse {
    Token(SecretString),
    AlreadyBootstrapped,
}

/// Thin wrapper over `reqwest` for the ACL endpoints.
#[derive(Debug, Clone)]
pub struct SchedulerClient {
    http: Client,
    base_url: String,
}

impl SchedulerClient {
    pub fn new(config: SchedulerClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(pem) = &config.ca_certificate_pem {
            let certificates = reqwest::Certificate::from_pem_bundle(pem.as_bytes())
                .map_err(|e| Error::config(format!("invalid scheduler CA certificate: {e}")))?;
            if certificates.is_empty() {
                return Err(Error::config("scheduler CA certificate bundle is empty"));
            }
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let http = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url: config.base_url() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /v1/acl/bootstrap`. A 400 means the cluster already has ACLs.
    pub async fn bootstrap(&self) -> Result<BootstrapResponse> {
        let path = "/v1/acl/bootstrap";
        let response = self.send(path, self.http.post(self.url(path))).await?;

        match response.status() {
            StatusCode::OK => {
                let token: BootstrapToken = response
                    .json()
                    .await
                    .map_err(|e| Error::scheduler_api(path, Some(200), format!("invalid body: {e}")))?;
                debug!(accessor_id = ?token.accessor_id, "Received bootstrap token");
                Ok(BootstrapResponse::Token(token.secret_id))
            }
            StatusCode::BAD_REQUEST => Ok(BootstrapResponse::AlreadyBootstrapped),
            status => Err(error_from_response(path, status, response).await),
        }
    }

    pub async fn create_policy(&self, token: &SecretString, policy: &AclPolicy) -> Result<()> {
        self.post_acl(&format!("/v1/acl/policy/{}", policy.name), token, policy).await
    }

    pub async fn create_auth_method(&self, token: &SecretString, method: &AclAuthMethod) -> Result<()> {
        self.post_acl("/v1/acl/auth-method", token, method).await
    }

    pub async fn create_role(&self, token: &SecretString, role: &AclRole) -> Result<()> {
        self.post_acl("/v1/acl/role", token, role).await
    }

    pub async fn create_binding_rule(&self, token: &SecretString, rule: &AclBindingRule) -> Result<()> {
        self.post_acl("/v1/acl/binding-rule", token, rule).await
    }

    async fn post_acl<T: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &SecretString,
        body: &T,
    ) -> Result<()> {
        let request =
            self.http.post(self.url(path)).header(TOKEN_HEADER, token.expose_secret()).json(body);
        let response = self.send(path, request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(path, status, response).await);
        }
        trace!(path = %path, status = status.as_u16(), "ACL request accepted");
        Ok(())
    }

    async fn send(&self, path: &str, request: reqwest::RequestBuilder) -> Result<Response> {
        debug!(url = %self.url(path), "POST");
        request.send().await.map_err(|e| Error::scheduler_api(path, None, e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn error_from_response(path: &str, status: StatusCode, response: Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body.trim().to_string()
    };
    Error::scheduler_api(path, Some(status.as_u16()), message)
}
