//! Randomized pauses between wallets and actions.

use std::time::Duration;

use tokio::time::sleep;

use crate::config::DelayRange;

/// Sleep for a duration drawn from `range` and return it.
pub async fn pause(range: DelayRange, reason: &'static str) -> Duration {
    let delay = range.sample();
    if !delay.is_zero() {
        tracing::debug!(delay_ms = delay.as_millis() as u64, reason, "Pausing");
        sleep(delay).await;
    }
    delay
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_for_sampled_delay() {
        let range = DelayRange::new(5_000, 10_000);
        for _ in 0..20 {
            let start = Instant::now();
            let delay = pause(range, "test").await;
            assert!(delay >= Duration::from_millis(5_000));
            assert!(delay <= Duration::from_millis(10_000));
            assert!(start.elapsed() >= delay);
        }
    }

    #[tokio::test]
    async fn test_zero_range_does_not_sleep() {
        assert_eq!(pause(DelayRange::new(0, 0), "test").await, Duration::ZERO);
    }
}
