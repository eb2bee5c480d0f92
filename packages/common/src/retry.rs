use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

/// Bounded polling schedule for waiting on remote work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of polling rounds before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry, doubled on every following round.
    pub base_delay_ms: u64,
    /// Upper bound for a single delay.
    pub max_delay_ms: u64,
}

impl PollPolicy {
    /// Delay to wait after the given 1-based failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            base_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}
