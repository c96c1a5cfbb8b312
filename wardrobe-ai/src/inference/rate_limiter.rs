//! Minimum-spacing rate limiter for remote model calls
//!
//! One instance is shared (via `Arc`) by every tier of an inference client.
//! The timestamp sits behind an async mutex that stays locked while the
//! caller sleeps, so concurrent callers are serialized through it.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Rate limiter enforcing a minimum interval between calls
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait if necessary to comply with the interval, then stamp the call time
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.interval {
                let wait_time = self.interval - elapsed;
                debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limiting: waiting before remote call"
                );
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
