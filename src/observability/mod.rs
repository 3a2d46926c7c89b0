//! # Observability
//!
//! Structured logging through `tracing`. Key material and tokens never
//! reach a log line: they are wrapped in
//! [`SecretString`](crate::secrets::SecretString), and signing requests are
//! logged by SHA-256 fingerprint only.

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
