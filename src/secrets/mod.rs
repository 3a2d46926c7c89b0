//! Secret and parameter store contracts.
//!
//! The issuance and bootstrap workflows write key material and tokens to a
//! [`SecretStore`] and read policy documents from a [`ParameterStore`]. Both
//! are injected into the workflows at construction time.
//!
//! # Backends
//!
//! - **In-memory** ([`MemorySecretStore`], [`MemoryParameterStore`]): tests and
//!   local dry runs
//! - **AWS Secrets Manager / SSM** (`aws` feature): [`SecretsManagerStore`],
//!   [`SsmParameterStore`]
//!
//! Errors from AWS keep the service's error code (`DecryptionFailure`,
//! `ResourceNotFoundException`, ...) in [`SecretsError::Service`].
//!
//! Secret values that stay in process memory are wrapped in [`SecretString`],
//! which redacts itself in `Debug`, `Display` and serde output.

#[cfg(feature = "aws")]
pub mod aws;
pub mod client;
pub mod error;
pub mod memory;
pub mod types;

#[cfg(feature = "aws")]
pub use aws::{SecretsManagerStore, SsmParameterStore};
pub use client::{ParameterStore, SecretStore};
pub use error::SecretsError;
pub use memory::{MemoryParameterStore, MemorySecretStore};
pub use types::{serialize_exposed, SecretString};
