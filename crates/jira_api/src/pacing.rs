//! Spacing of Jira requests issued through one client.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Hands out request slots at least `interval` apart. Clones share the schedule.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Sleeps until the next free slot and books the one after it.
    /// Returns how long the caller was held back.
    pub async fn pace(&self) -> Duration {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let held = match *next_slot {
            Some(slot) if slot > now => {
                let wait = slot - now;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "jira: holding request");
                sleep_until(slot).await;
                wait
            }
            _ => Duration::ZERO,
        };
        *next_slot = Some(Instant::now() + self.interval);
        held
    }
}
