//! Minimum-interval gate in front of the provider.
//!
//! One shared gate per service instance: every outbound call waits until at
//! least the configured interval has passed since the previous call was
//! released, then stamps the new release time. The read/sleep/stamp sequence
//! is a single critical section — the mutex is intentionally held across the
//! sleep so two concurrent callers can never both observe a stale stamp and
//! proceed without waiting.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Simple throttle, not a fair scheduler: callers are released one at a time
/// in lock-acquisition order, with no queueing or prioritization beyond that.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: Mutex::new(None),
        }
    }

    /// Block until the minimum interval since the previous release has
    /// elapsed, then record the new release time.
    pub async fn acquire(&self) {
        let mut last = self.last_release.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
