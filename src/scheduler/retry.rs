//! Bounded retry for scheduler calls that race cluster start-up.

use serde::Deserialize;
use std::time::Duration;

use crate::errors::Error;

/// Exponential backoff settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Backoff before the second attempt
    #[serde(with = "millis")]
    pub initial_backoff: Duration,
    /// Cap for exponential growth
    #[serde(with = "millis")]
    pub max_backoff: Duration,
    /// Growth factor between consecutive backoffs
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate the backoff duration for a given attempt number (0-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32 - 1);
        let backoff_ms = self.initial_backoff.as_millis() as f64 * multiplier;
        let capped_ms = backoff_ms.min(self.max_backoff.as_millis() as f64);

        Duration::from_millis(capped_ms as u64)
    }
}

/// Whether a scheduler error is worth another attempt.
///
/// Transport failures, 5xx and 429 are; other statuses are final.
pub fn is_transient(error: &Error) -> bool {
    match error {
        Error::SchedulerApi { status: None, .. } => true,
        Error::SchedulerApi { status: Some(status), .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.max_backoff, Duration::from_secs(10));
        assert!((config.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_backoff_calculation() {
        let config = RetryConfig::default();

        assert_eq!(config.backoff_for_attempt(0), Duration::ZERO);
        assert_eq!(config.backoff_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.backoff_for_attempt(3), Duration::from_secs(4));
        // capped
        assert_eq!(config.backoff_for_attempt(6), Duration::from_secs(10));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&Error::scheduler_api("/v1/acl/bootstrap", None, "connection refused")));
        assert!(is_transient(&Error::scheduler_api("/v1/acl/bootstrap", Some(503), "no leader")));
        assert!(is_transient(&Error::scheduler_api("/v1/acl/bootstrap", Some(429), "slow down")));
        assert!(!is_transient(&Error::scheduler_api("/v1/acl/bootstrap", Some(403), "denied")));
        assert!(!is_transient(&Error::config("bad")));
    }

    #[test]
    fn test_deserialize_from_millis() {
        let config: RetryConfig = serde_json::from_str(
            r#"{"max_attempts":3,"initial_backoff":250,"max_backoff":2000,"backoff_multiplier":1.5}"#,
        )
        .unwrap();
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, Duration::from_secs(2));
    }
}
