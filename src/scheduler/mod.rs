//! # Scheduler ACL Bootstrap
//!
//! Client and workflow for the Nomad ACL API. The bootstrap token can only
//! be obtained once per cluster; a second attempt answers 400, which is
//! reported as [`BootstrapOutcome::AlreadyBootstrapped`] rather than an
//! error.

pub mod bootstrap;
pub mod client;
pub mod retry;
pub mod types;

pub use bootstrap::{AclBootstrapper, BootstrapOutcome};
pub use client::{BootstrapResponse, SchedulerClient, SchedulerClientConfig};
pub use retry::{is_transient, RetryConfig};
