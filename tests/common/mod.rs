//! Common test utilities for all integration tests.
//!
//! Provides a scriptable certificate authority and issuer helpers.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod mock_authority;

pub use mock_authority::MockAuthority;

use std::sync::Arc;
use std::time::Duration;

use pki_bootstrap::certificates::{CaClient, CertificateIssuer, KeyAndRequestBuilder, PollConfig};

pub const TEST_AUTHORITY_ARN: &str =
    "arn:aws:acm-pca:us-east-1:111122223333:certificate-authority/11111111-2222-3333-4444-555555555555";

/// Poll settings matching production spacing; tests run with a paused clock.
pub fn poll_config(max_attempts: u32) -> PollConfig {
    PollConfig { interval: Duration::from_secs(3), max_attempts, deadline: None }
}

pub fn issuer(authority: Arc<MockAuthority>, poll: PollConfig) -> CertificateIssuer {
    CertificateIssuer::new(KeyAndRequestBuilder::default(), CaClient::new(authority), poll)
}
