//! In-process secret and parameter stores.
//!
//! Used by the test suite and for dry runs of the handlers without AWS
//! credentials. Values live only as long as the store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::client::{validate_name, ParameterStore, SecretStore};
use super::error::{Result, SecretsError};

/// Secret store backed by a `HashMap`.
///
/// Writes are recorded in order so callers can assert on what was delivered.
/// Names registered with [`MemorySecretStore::fail_puts_to`] reject `put`
/// with a `Service` error, which lets partial-delivery paths be exercised.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<RwLock<Vec<String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without recording it as a write.
    pub async fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(name.into(), value.into());
    }

    /// Make every subsequent `put` to `name` fail.
    pub async fn fail_puts_to(&self, name: impl Into<String>) {
        self.failing.write().await.insert(name.into());
    }

    /// Names passed to successful `put` calls, in call order.
    pub async fn writes(&self) -> Vec<String> {
        self.writes.read().await.clone()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.values.read().await.contains_key(name)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;
        if self.failing.read().await.contains(name) {
            return Err(SecretsError::service(
                name,
                "InternalServiceError",
                "injected failure",
            ));
        }

        self.values.write().await.insert(name.to_string(), value.to_string());
        self.writes.write().await.push(name.to_string());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        self.values
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SecretsError::not_found(name))
    }
}

/// Parameter store backed by a `HashMap`.
///
/// Values inserted with [`MemoryParameterStore::insert_secure`] behave like
/// SSM `SecureString` parameters: reading them without decryption returns
/// an opaque placeholder instead of the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryParameterStore {
    values: Arc<RwLock<HashMap<String, (String, bool)>>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(name.into(), (value.into(), false));
    }

    pub async fn insert_secure(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(name.into(), (value.into(), true));
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get(&self, name: &str, with_decryption: bool) -> Result<String> {
        validate_name(name)?;
        let values = self.values.read().await;
        match values.get(name) {
            Some((value, secure)) if !*secure || with_decryption => Ok(value.clone()),
            Some((_, _)) => Ok("[ENCRYPTED]".to_string()),
            None => Err(SecretsError::not_found(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemorySecretStore::new();
        store.put("robot-Certificate", "-----BEGIN CERTIFICATE-----").await.unwrap();

        assert_eq!(store.get("robot-Certificate").await.unwrap(), "-----BEGIN CERTIFICATE-----");
        assert_eq!(store.writes().await, vec!["robot-Certificate".to_string()]);
    }

    #[tokio::test]
    async fn test_get_missing_secret() {
        let store = MemorySecretStore::new();
        let err = store.get("ca-caCertificate").await.unwrap_err();
        assert!(matches!(err, SecretsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_seeded_values_are_not_writes() {
        let store = MemorySecretStore::new();
        store.insert("ca-caCertificate", "chain").await;

        assert!(store.contains("ca-caCertificate").await);
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_put_failure_keeps_code() {
        let store = MemorySecretStore::new();
        store.fail_puts_to("robot-PrivateKey").await;

        let err = store.put("robot-PrivateKey", "key").await.unwrap_err();
        assert_eq!(err.code(), Some("InternalServiceError"));
        assert!(!store.contains("robot-PrivateKey").await);
    }

    #[tokio::test]
    async fn test_parameter_decryption_flag() {
        let params = MemoryParameterStore::new();
        params.insert("/infrastructure/nomad/policies/submit-job", "namespace \"*\" {}").await;
        params.insert_secure("/secure", "hidden").await;

        assert_eq!(
            params.get("/infrastructure/nomad/policies/submit-job", false).await.unwrap(),
            "namespace \"*\" {}"
        );
        assert_eq!(params.get("/secure", false).await.unwrap(), "[ENCRYPTED]");
        assert_eq!(params.get("/secure", true).await.unwrap(), "hidden");
        assert!(params.get("/missing", false).await.is_err());
    }
}
