//! `acl-bootstrap`: bootstrap scheduler ACLs with AWS-backed stores.

use super::AwsArgs;

#[cfg(feature = "aws")]
pub(crate) async fn handle_acl_bootstrap(aws: &AwsArgs) -> anyhow::Result<()> {
    use std::sync::Arc;

    use crate::config::AclBootstrapSettings;
    use crate::handlers::bootstrap_acl;
    use crate::secrets::{SecretsManagerStore, SsmParameterStore};

    let settings = AclBootstrapSettings::from_env()?;
    let sdk = crate::aws::load_sdk_config(aws.profile.as_deref(), aws.region.as_deref()).await;

    let report = bootstrap_acl(
        settings,
        Arc::new(SecretsManagerStore::new(&sdk)),
        Arc::new(SsmParameterStore::new(&sdk)),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(not(feature = "aws"))]
pub(crate) async fn handle_acl_bootstrap(_aws: &AwsArgs) -> anyhow::Result<()> {
    crate::config::AclBootstrapSettings::from_env()?;
    anyhow::bail!("ACL bootstrap needs AWS Secrets Manager and SSM; rebuild with `--features aws`")
}
