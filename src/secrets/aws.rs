//! AWS Secrets Manager and SSM Parameter Store adapters.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::{debug, info};

use super::client::{validate_name, ParameterStore, SecretStore};
use super::error::{Result, SecretsError};

/// Secret store backed by AWS Secrets Manager.
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_secretsmanager::Client::new(config) }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    /// `PutSecretValue`, falling back to `CreateSecret` when the secret does
    /// not exist yet.
    async fn put(&self, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;

        let result =
            self.client.put_secret_value().secret_id(name).secret_string(value).send().await;

        match result {
            Ok(_) => {
                info!(secret = %name, "Stored secret value");
                Ok(())
            }
            Err(err) if err.code() == Some("ResourceNotFoundException") => {
                debug!(secret = %name, "Secret does not exist, creating it");
                self.client
                    .create_secret()
                    .name(name)
                    .secret_string(value)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(name, e))?;
                info!(secret = %name, "Created secret");
                Ok(())
            }
            Err(err) => Err(map_sdk_error(name, err)),
        }
    }

    async fn get(&self, name: &str) -> Result<String> {
        validate_name(name)?;

        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| map_sdk_error(name, e))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretsError::invalid_value(name, "secret should be stored as SecretString"))
    }
}

/// Parameter store backed by AWS Systems Manager.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_ssm::Client::new(config) }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get(&self, name: &str, with_decryption: bool) -> Result<String> {
        validate_name(name)?;

        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|e| map_sdk_error(name, e))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| SecretsError::invalid_value(name, "parameter has no value"))
    }
}

/// Dispatch and timeout failures become `ConnectionFailed`; everything the
/// service answered keeps its error code.
fn map_sdk_error<E, R>(name: &str, err: SdkError<E, R>) -> SecretsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            SecretsError::connection_failed(DisplayErrorContext(&err).to_string())
        }
        _ => {
            let code = err.code().unwrap_or("Unknown").to_string();
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            SecretsError::service(name, code, message)
        }
    }
}
