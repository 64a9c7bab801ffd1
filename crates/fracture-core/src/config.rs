//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max retries the exchange transport attempts on a transient failure
    /// before surfacing a query-level error.
    pub exchange_retry_max_retries: usize,

    /// Initial backoff between transport retries; doubles per attempt.
    pub exchange_retry_initial_backoff_ms: u64,

    /// Backoff cap.
    pub exchange_retry_max_backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exchange_retry_max_retries: 3,
            exchange_retry_initial_backoff_ms: 200,
            exchange_retry_max_backoff_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FRACTURE_EXCHANGE_RETRY_MAX_RETRIES`: max transport retries
    /// - `FRACTURE_EXCHANGE_RETRY_INITIAL_MS`: initial retry backoff
    /// - `FRACTURE_EXCHANGE_RETRY_MAX_MS`: retry backoff cap
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("FRACTURE_EXCHANGE_RETRY_MAX_RETRIES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.exchange_retry_max_retries = v;
            }
        }

        if let Ok(s) = std::env::var("FRACTURE_EXCHANGE_RETRY_INITIAL_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.exchange_retry_initial_backoff_ms = v;
            }
        }

        if let Ok(s) = std::env::var("FRACTURE_EXCHANGE_RETRY_MAX_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.exchange_retry_max_backoff_ms = v;
            }
        }

        cfg
    }

    /// Snapshot of the transport retry policy used by the exchange layer.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.exchange_retry_max_retries,
            initial_backoff_ms: self.exchange_retry_initial_backoff_ms,
            max_backoff_ms: self.exchange_retry_max_backoff_ms,
        }
    }
}

/// Bounded retry policy for the exchange transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Policy with no waiting between attempts, for tests and replay.
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Exponential backoff for the given 1-based attempt number, capped.
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as u32;
        let ms = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_snapshots_the_config_knobs() {
        let cfg = EngineConfig {
            exchange_retry_max_retries: 7,
            exchange_retry_initial_backoff_ms: 10,
            exchange_retry_max_backoff_ms: 40,
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_retries, 7);
        assert_eq!(policy.backoff_for(1), Duration::from_millis(10));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(20));
        // Capped from attempt 3 on.
        assert_eq!(policy.backoff_for(5), Duration::from_millis(40));
    }

    #[test]
    fn from_env_overrides_the_defaults() {
        std::env::set_var("FRACTURE_EXCHANGE_RETRY_MAX_RETRIES", "9");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.exchange_retry_max_retries, 9);
        assert_eq!(
            cfg.exchange_retry_initial_backoff_ms,
            EngineConfig::default().exchange_retry_initial_backoff_ms
        );
        std::env::remove_var("FRACTURE_EXCHANGE_RETRY_MAX_RETRIES");
    }
}
