//! Caller-side retry policy for admin API calls.
//!
//! # Responsibilities
//! - Retry only failures where the call did not complete (never decode errors)
//! - Space attempts with exponential backoff + jitter
//!
//! # Design Decisions
//! - The upstream client never retries on its own; callers opt in here
//! - Only idempotent reads are wrapped (the bucket list call)

use std::future::Future;

use crate::config::UpstreamConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::upstream::UpstreamError;

/// How many times to repeat a failed call and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub extra_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            extra_attempts: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            extra_attempts: config.list_retries,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up. Returns the last error.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, UpstreamError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_unavailable() && attempt <= self.extra_attempts => {
                    let delay = calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms);
                    tracing::info!(call = %what, attempt, delay = ?delay, error = %e, "Retrying admin API call");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
