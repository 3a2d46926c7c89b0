//! # Structured Logging
//!
//! Span macros for the two workflows and the subscriber setup used by the
//! CLI. Every span carries a fresh `operation_id` so that the lines of one
//! issuance or bootstrap run can be grouped in JSON output.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Create a tracing span for one certificate issuance.
///
/// ```rust,ignore
/// let span = issuance_span!("robot-1", authority = %arn);
/// ```
#[macro_export]
macro_rules! issuance_span {
    ($label:expr) => {
        tracing::info_span!(
            "certificate_issuance",
            label = %$label,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($label:expr, $($field:tt)*) => {
        tracing::info_span!(
            "certificate_issuance",
            label = %$label,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for scheduler ACL operations.
#[macro_export]
macro_rules! acl_span {
    ($operation:expr) => {
        tracing::info_span!(
            "acl_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "acl_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Subscriber options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl LoggingConfig {
    /// Level used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// A second call is a no-op, which keeps tests that share a process happy.
pub fn init_logging(config: LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let result = if config.json {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).json().with_current_span(true).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).with_target(false).finish(),
        )
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = issuance_span!("robot-1");
        let _span = issuance_span!("robot-1", authority = "arn:ca");
        let _span = acl_span!("bootstrap");
        let _span = acl_span!("register_policy", policy = "submit-job");
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(LoggingConfig::default().default_directive(), "info");
        assert_eq!(LoggingConfig { verbose: true, json: false }.default_directive(), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig { verbose: true, json: true });
    }
}
