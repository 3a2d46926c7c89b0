//! Secret store and parameter store contracts.

use async_trait::async_trait;

use super::error::Result;

/// Key/value secret service (AWS Secrets Manager in the reference deployment).
///
/// Implementations MUST NOT log secret values. Errors are surfaced to the
/// caller as-is; nothing is retried internally.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store or overwrite the value under `name`.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`](super::SecretsError::NotFound) if the
    ///   backend requires the secret to exist first
    /// - [`SecretsError::Service`](super::SecretsError::Service) with the
    ///   backend's error code for anything else it rejects
    async fn put(&self, name: &str, value: &str) -> Result<()>;

    /// Retrieve the string value stored under `name`.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`](super::SecretsError::NotFound)
    /// - [`SecretsError::InvalidValue`](super::SecretsError::InvalidValue) if
    ///   the secret is stored as binary
    /// - [`SecretsError::Service`](super::SecretsError::Service) for
    ///   decryption, parameter and request errors
    async fn get(&self, name: &str) -> Result<String>;
}

/// Read-only parameter service (AWS SSM Parameter Store).
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Retrieve a parameter, decrypting `SecureString` values when asked to.
    async fn get(&self, name: &str, with_decryption: bool) -> Result<String>;
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    async fn put(&self, name: &str, value: &str) -> Result<()> {
        (**self).put(name, value).await
    }

    async fn get(&self, name: &str) -> Result<String> {
        (**self).get(name).await
    }
}

#[async_trait]
impl<T: ParameterStore + ?Sized> ParameterStore for std::sync::Arc<T> {
    async fn get(&self, name: &str, with_decryption: bool) -> Result<String> {
        (**self).get(name, with_decryption).await
    }
}

/// Reject names a backend would refuse anyway, before a round trip.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(super::SecretsError::invalid_key(name, "must not be empty"));
    }
    if name.len() > 512 {
        return Err(super::SecretsError::invalid_key(name, "longer than 512 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("/infrastructure/nomad/token/bootstrap").is_ok());
        assert!(validate_name("robot-PrivateKey").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(513)).is_err());
    }
}
