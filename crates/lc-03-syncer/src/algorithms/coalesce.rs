//! # Coalescing and Generations
//!
//! Two small guards used by every provider: at most one outstanding
//! request per resource, and a generation number that lets a stopped
//! cycle's late responses recognise themselves as stale.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Single-flight flag for one resource.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    /// Claim the resource. `None` if a request is already outstanding.
    pub fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard(&self.0))
    }

    /// True while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the resource on drop, including when the request future is
/// cancelled.
#[derive(Debug)]
pub struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Monotonic cycle counter.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Start a new cycle, invalidating every earlier one.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Current cycle.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// True if `generation` has not been superseded.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_coalesced() {
        let flight = InFlight::default();
        let guard = flight.try_begin();
        assert!(guard.is_some());
        assert!(flight.try_begin().is_none());
        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_begin().is_some());
    }

    #[test]
    fn test_generation_supersedes() {
        let generation = Generation::default();
        let first = generation.advance();
        assert!(generation.is_current(first));
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
