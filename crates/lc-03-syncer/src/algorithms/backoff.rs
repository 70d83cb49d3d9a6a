//! # Backoff
//!
//! Exponential delay with a cap. Polling uses the plain delay; reconnects
//! draw uniformly from `[0, delay]` (full jitter) so many clients do not
//! retry in lockstep.

use rand::Rng;
use std::time::Duration;

/// Failure counter turning consecutive failures into delays.
#[derive(Clone, Debug)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    /// Delays start at `base` and double up to `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: 0,
        }
    }

    /// Consecutive failures recorded since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Forget all failures.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Current capped delay without recording a failure.
    pub fn current(&self) -> Duration {
        // 2^31 * base overflows long before it matters; saturate instead
        let factor = 1u32.checked_shl(self.failures).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// Record a failure and return the delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current();
        self.failures = self.failures.saturating_add(1);
        delay
    }

    /// Record a failure and return a full-jitter delay in `[0, next_delay]`.
    pub fn next_jittered<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let cap = self.next_delay();
        let millis = cap.as_millis().min(u64::MAX as u128) as u64;
        Duration::from_millis(rng.gen_range(0..=millis))
    }
}
