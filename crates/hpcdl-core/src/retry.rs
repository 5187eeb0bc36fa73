//! Script-level retry and backoff policy.
//!
//! This is the driver's own loop around whole transfer attempts, distinct
//! from the retries the transfer tool performs internally. Backoff doubles
//! from the initial delay and is capped at [`MAX_BACKOFF`].

use std::time::Duration;

use crate::config::HpcConfig;

/// Upper bound on the backoff delay between attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Exponential backoff policy for the script-level retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Re-attempts after the first (total attempts = this + 1).
    pub max_retries: u32,
    /// Delay before the first retry; doubles per retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Policy for the initial pass.
    pub fn from_config(cfg: &HpcConfig) -> Self {
        Self {
            max_retries: cfg.downloader_max_retries,
            initial_delay: Duration::from_secs(cfg.downloader_initial_retry_delay_seconds),
        }
    }

    /// Harsher policy for the aggressive retry pass.
    pub fn aggressive(cfg: &HpcConfig) -> Self {
        Self {
            max_retries: cfg.downloader_aggressive_max_retries,
            initial_delay: Duration::from_secs(
                cfg.downloader_aggressive_initial_retry_delay_seconds,
            ),
        }
    }

    /// Total attempts the driver may make, including the first.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay to sleep before the given 1-based attempt.
    ///
    /// The first attempt starts immediately. Attempt k >= 2 waits
    /// `initial * 2^(k-2)`, capped at [`MAX_BACKOFF`].
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return None;
        }
        let doublings = (attempt - 2).min(31);
        let raw = self.initial_delay.saturating_mul(1u32 << doublings);
        Some(raw.min(MAX_BACKOFF))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_has_no_delay() {
        let p = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_secs(10),
        };
        assert_eq!(p.delay_before(1), None);
    }

    #[test]
    fn backoff_doubles_and_caps_at_300s() {
        let p = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_secs(100),
        };
        assert_eq!(p.delay_before(2), Some(Duration::from_secs(100)));
        assert_eq!(p.delay_before(3), Some(Duration::from_secs(200)));
        assert_eq!(p.delay_before(4), Some(Duration::from_secs(300)));
        assert_eq!(p.delay_before(5), Some(Duration::from_secs(300)));
        // Very deep attempts must not overflow past the cap either.
        assert_eq!(p.delay_before(60), Some(Duration::from_secs(300)));
    }

    #[test]
    fn sequence_from_documented_default() {
        let p = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_secs(10),
        };
        let delays: Vec<u64> = (1..=p.total_attempts())
            .filter_map(|a| p.delay_before(a))
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(delays, vec![10, 20, 40, 80, 160]);
    }

    #[test]
    fn total_attempts_counts_the_first() {
        let p = RetryPolicy {
            max_retries: 0,
            initial_delay: Duration::from_secs(1),
        };
        assert_eq!(p.total_attempts(), 1);
    }
}
