//! Nomad ACL request and response bodies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::secrets::{serialize_exposed, SecretString};

/// Body of a successful `POST /v1/acl/bootstrap`.
#[derive(Debug, Deserialize)]
pub struct BootstrapToken {
    #[serde(rename = "AccessorID", default)]
    pub accessor_id: Option<String>,
    #[serde(rename = "SecretID")]
    pub secret_id: SecretString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclPolicy {
    pub name: String,
    pub description: String,
    pub rules: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclAuthMethod {
    pub name: String,
    #[serde(rename = "Type")]
    pub method_type: String,
    pub token_locality: String,
    #[serde(rename = "MaxTokenTTL")]
    pub max_token_ttl: String,
    pub default: bool,
    pub config: OidcConfig,
}

/// OIDC settings of an auth method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OidcConfig {
    #[serde(rename = "OIDCDiscoveryURL")]
    pub discovery_url: String,
    #[serde(rename = "OIDCClientID")]
    pub client_id: String,
    #[serde(rename = "OIDCClientSecret", serialize_with = "serialize_exposed")]
    pub client_secret: SecretString,
    #[serde(rename = "OIDCScopes")]
    pub scopes: Vec<String>,
    pub bound_audiences: Vec<String>,
    #[serde(rename = "AllowedRedirectURIs")]
    pub allowed_redirect_uris: Vec<String>,
    pub claim_mappings: BTreeMap<String, String>,
    pub list_claim_mappings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyLink {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclRole {
    pub name: String,
    pub description: String,
    pub policies: Vec<PolicyLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclBindingRule {
    pub description: String,
    pub auth_method: String,
    pub bind_type: String,
    pub bind_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}
