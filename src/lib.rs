//! # pki-bootstrap
//!
//! Bootstrap tooling for a private PKI and the cluster scheduler that
//! trusts it.
//!
//! ## Architecture
//!
//! ```text
//! IdentityDescriptor → KeyAndRequestBuilder → CaClient (submit, poll, fetch) → OutputSink
//!                                                  ↓
//!                                        CertificateAuthority (ACM PCA)
//!
//! AclBootstrapper → SchedulerClient (/v1/acl/*) + SecretStore + ParameterStore
//! ```
//!
//! ## Core Components
//!
//! - **Certificates**: key pair and CSR generation, the CA client with a
//!   bounded poll loop, and filesystem / secret-store / structured sinks
//! - **Scheduler**: one-shot ACL bootstrap with OIDC auth method setup
//! - **Secrets**: secret and parameter store contracts with in-memory and
//!   AWS implementations
//! - **Handlers**: request/response entry points over both workflows
//!
//! AWS adapters are compiled with the `aws` feature.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use pki_bootstrap::certificates::*;
//! use pki_bootstrap::cli::provision::provision_robot;
//!
//! let issuer = CertificateIssuer::new(
//!     KeyAndRequestBuilder::new(settings.request_policy()),
//!     CaClient::new(authority),
//!     settings.poll_config(),
//! );
//! let files = provision_robot(&issuer, "robot-1", "us-east-1", &settings, &cancel).await?;
//! ```

#[cfg(feature = "aws")]
pub mod aws;
pub mod certificates;
pub mod cli;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod observability;
pub mod scheduler;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{AclBootstrapSettings, IssuanceSettings};
pub use errors::{Error, Result};
pub use observability::{init_logging, LoggingConfig};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
