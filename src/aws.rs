//! Shared AWS SDK setup for the `aws` feature.

use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load SDK configuration, optionally pinned to a named credential profile
/// and region. Unset values fall back to the default provider chain.
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = profile {
        let credentials_provider =
            ProfileFileCredentialsProvider::builder().profile_name(profile).build();
        loader = loader.credentials_provider(credentials_provider);
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }

    tracing::debug!(profile = ?profile, region = ?region, "Loading AWS SDK configuration");
    loader.load().await
}
