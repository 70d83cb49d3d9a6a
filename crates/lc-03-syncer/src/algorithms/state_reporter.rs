//! # Sync State Reporter
//!
//! Remembers the last reported `SyncState` and filters out consecutive
//! duplicates under the relaxed equality of `SyncState`.

use shared_types::SyncState;

/// Deduplicating holder of the last reported state.
#[derive(Debug, Default)]
pub struct SyncStateReporter {
    last: SyncState,
}

impl SyncStateReporter {
    /// Start from `initial`, which counts as already reported.
    pub fn new(initial: SyncState) -> Self {
        Self { last: initial }
    }

    /// Most recent state, with the most recent reason.
    pub fn current(&self) -> &SyncState {
        &self.last
    }

    /// Record `next`. Returns `true` when subscribers must hear about it.
    ///
    /// A suppressed `NotSynced` still replaces the stored reason so
    /// snapshots stay accurate.
    pub fn observe(&mut self, next: SyncState) -> bool {
        let changed = self.last != next;
        self.last = next;
        changed
    }
}
