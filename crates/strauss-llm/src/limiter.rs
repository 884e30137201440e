//! Token-bucket rate limiter for gating call frequency
//!
//! The limiter is a cross-cutting throttle, not a correctness mechanism:
//! leaving it out changes only latency and cost, never results.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Blocking token bucket.
///
/// Tokens refill continuously at `rate` per second up to `capacity`;
/// `acquire` blocks the calling thread, polling roughly once per refill
/// interval until a token is available.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Bucket with the given refill rate; capacity defaults to the rate,
    /// floored at one token so a single `acquire` always fits.
    ///
    /// Rates below 0.1/s are clamped up so the poll interval stays bounded.
    pub fn new(rate_per_sec: f64) -> Self {
        let rate = rate_per_sec.max(0.1);
        Self::with_capacity(rate, rate.max(1.0))
    }

    /// Bucket with an explicit capacity (burst size).
    pub fn with_capacity(rate_per_sec: f64, capacity: f64) -> Self {
        let rate = rate_per_sec.max(0.1);
        Self {
            rate,
            capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, blocking until it is available.
    pub fn acquire(&self) {
        self.acquire_n(1.0);
    }

    /// Take `amount` tokens, blocking until they are available.
    ///
    /// `amount` must not exceed the bucket capacity, or it can never be
    /// satisfied.
    pub fn acquire_n(&self, amount: f64) {
        loop {
            {
                let mut state = self.state.lock().unwrap();
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.last_refill = now;
                state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
                if state.tokens >= amount {
                    state.tokens -= amount;
                    return;
                }
            }
            thread::sleep(Duration::from_secs_f64(1.0 / self.rate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_within_capacity_is_immediate() {
        let bucket = TokenBucket::with_capacity(100.0, 3.0);
        let start = Instant::now();
        bucket.acquire();
        bucket.acquire();
        bucket.acquire();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_acquire_blocks_once_drained() {
        let bucket = TokenBucket::with_capacity(100.0, 1.0);
        bucket.acquire();

        let start = Instant::now();
        bucket.acquire();
        // Needs one refill interval (~10ms at 100/s) before the second token.
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_rate_is_clamped() {
        // A zero rate would never refill and the poll interval would divide
        // by zero; construction must clamp it.
        let bucket = TokenBucket::new(0.0);
        let start = Instant::now();
        bucket.acquire();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_sub_one_rate_still_holds_a_whole_token() {
        // Capacity must fit one whole token even when the refill rate is
        // below 1/s, or this acquire would never return.
        let bucket = TokenBucket::new(0.5);
        let start = Instant::now();
        bucket.acquire();
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
