//! Retry/backoff policy for internal pipeline stages, per spec §4.8.

use carscout_shared::config::RetryConfig;
use chrono::Duration as ChronoDuration;
use std::time::Duration as StdDuration;

/// Exponential backoff, starting at `base_backoff_seconds` and doubling per
/// attempt, with no cap on the delay itself (the attempt-count cap is
/// enforced separately via [`exhausted`]).
pub fn backoff_for(attempt: u32, config: &RetryConfig) -> ChronoDuration {
    let exponent = attempt.saturating_sub(1).min(20);
    let seconds = config.base_backoff_seconds.saturating_mul(1u64 << exponent);
    ChronoDuration::seconds(seconds as i64)
}

/// Whether `attempt` has used up the retry budget.
pub fn exhausted(attempt: u32, config: &RetryConfig) -> bool {
    attempt >= config.max_attempts
}

/// The stage's soft timeout, as a [`std::time::Duration`] for wrapping the
/// handler future in `tokio::time::timeout`.
pub fn soft_timeout(config: &RetryConfig) -> StdDuration {
    StdDuration::from_secs(config.soft_timeout_seconds)
}

/// The stage unit's lease TTL, matching the hard-kill timeout: if a worker
/// is killed mid-stage, the lease expires and another worker can pick the
/// unit back up.
pub fn lease_ttl(config: &RetryConfig) -> ChronoDuration {
    ChronoDuration::seconds(config.hard_timeout_seconds as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let cfg = RetryConfig {
            max_attempts: 6,
            base_backoff_seconds: 60,
            soft_timeout_seconds: 270,
            hard_timeout_seconds: 300,
        };
        assert_eq!(backoff_for(1, &cfg).num_seconds(), 60);
        assert_eq!(backoff_for(2, &cfg).num_seconds(), 120);
        assert_eq!(backoff_for(3, &cfg).num_seconds(), 240);
    }

    #[test]
    fn exhausted_at_cap() {
        let cfg = RetryConfig::default();
        assert!(exhausted(6, &cfg));
        assert!(!exhausted(5, &cfg));
    }
}
