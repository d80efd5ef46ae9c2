//! Retry policy for downstream forwarding.
//!
//! # Responsibilities
//! - Bound the number of attempts per batch
//! - Space attempts with jittered exponential backoff
//!
//! # Design Decisions
//! - Only errors the classifier marks retryable are retried
//! - Rejections (4xx) are never retried; resending the same batch cannot help

use std::time::Duration;

use rand::Rng;

use crate::config::DownstreamConfig;

/// How many times, and how far apart, a batch is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt`: the base delay doubled
    /// per attempt, capped at the maximum, plus up to 10% jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let capped = self.capped_delay_ms(attempt);
        let spread = capped / 10;
        let jitter = if spread > 0 {
            rand::thread_rng().gen_range(0..spread)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }

    /// Upper bound on the total time spent sleeping between attempts of one
    /// batch, jitter included.
    pub fn max_total_delay(&self) -> Duration {
        let total = (1..self.max_attempts)
            .map(|attempt| {
                let capped = self.capped_delay_ms(attempt);
                capped.saturating_add(capped / 10)
            })
            .fold(0u64, u64::saturating_add);
        Duration::from_millis(total)
    }

    fn capped_delay_ms(&self, attempt: u32) -> u64 {
        if attempt == 0 || self.base_delay_ms == 0 {
            return 0;
        }
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms)
    }
}

impl From<&DownstreamConfig> for RetryPolicy {
    fn from(config: &DownstreamConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}
