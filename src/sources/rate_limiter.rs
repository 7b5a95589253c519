// Request pacing for the Reddit listing API.
//
// Unauthenticated clients get throttled fast, so requests are spaced at a
// fixed interval. Each caller reserves the next free slot and sleeps until
// it arrives. Pacing only; nothing is retried.

use std::sync::Mutex;

use tokio::time::{sleep_until, Duration, Instant};

pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `requests_per_second <= 0` turns pacing off.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's slot.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }
        let slot = self.reserve(Instant::now());
        sleep_until(slot).await;
    }

    /// Claim the earliest slot at or after `now` and push the next one back
    /// by one interval.
    fn reserve(&self, now: Instant) -> Instant {
        let mut next = match self.next_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = next.map_or(now, |n| n.max(now));
        *next = Some(slot + self.interval);
        slot
    }
}
