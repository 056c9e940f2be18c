//! Retry delays.

use std::time::Duration;

use rand::Rng;

/// Delay before retry number `attempt` (1-based).
///
/// Doubles from `base_ms` up to `max_ms`, then picks uniformly from the upper
/// half of that window so concurrent callers do not retry in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let shift = (attempt - 1).min(32);
    let window = base_ms.saturating_mul(1u64 << shift).min(max_ms.max(base_ms));
    let floor = window / 2;
    let delay = if window > floor {
        rand::thread_rng().gen_range(floor..=window)
    } else {
        window
    };
    Duration::from_millis(delay)
}
