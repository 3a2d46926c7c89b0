//! `issue`: run the certificate request handler on a JSON event.

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use super::AwsArgs;
use crate::config::IssuanceSettings;
use crate::handlers::CertificateRequestEvent;

/// Read and parse an event from a file, or stdin for `-`.
pub async fn read_event(source: &str) -> anyhow::Result<CertificateRequestEvent> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await.context("failed to read event from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read event file {source}"))?
    };

    serde_json::from_str(&raw).context("event is not a valid certificate request")
}

#[cfg(feature = "aws")]
pub(crate) async fn handle_issue(
    source: &str,
    persist: bool,
    aws: &AwsArgs,
    settings: &IssuanceSettings,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    use std::sync::Arc;

    use crate::certificates::{AcmPcaAuthority, CertificateAuthority};
    use crate::handlers::CertificateRequestHandler;
    use crate::secrets::SecretsManagerStore;

    let event = read_event(source).await?;
    let sdk = crate::aws::load_sdk_config(aws.profile.as_deref(), aws.region.as_deref()).await;

    let authority_sdk = sdk.clone();
    let mut handler = CertificateRequestHandler::new(
        move |arn| Arc::new(AcmPcaAuthority::new(&authority_sdk, arn)) as Arc<dyn CertificateAuthority>,
        settings,
    );
    if persist {
        handler = handler.with_secret_store(Arc::new(SecretsManagerStore::new(&sdk)));
    }

    let bundle = handler.handle(event, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

#[cfg(not(feature = "aws"))]
pub(crate) async fn handle_issue(
    source: &str,
    _persist: bool,
    _aws: &AwsArgs,
    _settings: &IssuanceSettings,
    _cancel: &CancellationToken,
) -> anyhow::Result<()> {
    read_event(source).await?;
    anyhow::bail!("issuing needs AWS ACM Private CA; rebuild with `--features aws`")
}
