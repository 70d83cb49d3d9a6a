//! # Sync State
//!
//! Health of the link between the client and its provider.
//!
//! Equality is deliberately relaxed: every `NotSynced` compares equal to
//! every other `NotSynced`, whatever reason it carries, and two `Syncing`
//! values are equal iff their progress is equal. Producers use this equality
//! to suppress duplicate consecutive notifications, so a change of failure
//! reason alone is not re-announced.

use std::fmt;

/// Why the client is not synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotSyncedReason {
    /// The client has not been started, or was stopped.
    NotStarted,
    /// The network is reported unreachable.
    NoConnection,
    /// Transport-level failure talking to the provider.
    Connectivity(String),
    /// The provider answered with an error.
    Remote(String),
}

impl fmt::Display for NotSyncedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotSyncedReason::NotStarted => write!(f, "not started"),
            NotSyncedReason::NoConnection => write!(f, "no connection"),
            NotSyncedReason::Connectivity(msg) => write!(f, "connectivity: {}", msg),
            NotSyncedReason::Remote(msg) => write!(f, "remote: {}", msg),
        }
    }
}

/// Sync status of the client.
#[derive(Debug, Clone)]
pub enum SyncState {
    /// Up to date with the provider.
    Synced,
    /// Not synced, with the most recent reason.
    NotSynced(NotSyncedReason),
    /// Catching up. Progress, when known, lies in `[0, 1]`.
    Syncing(Option<f64>),
}

impl SyncState {
    /// Syncing with a progress fraction clamped into `[0, 1]`.
    pub fn syncing_with_progress(progress: f64) -> Self {
        SyncState::Syncing(Some(progress.clamp(0.0, 1.0)))
    }

    /// True for `Synced`.
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncState::Synced)
    }

    /// True for `NotSynced`.
    pub fn is_not_synced(&self) -> bool {
        matches!(self, SyncState::NotSynced(_))
    }

    /// True for `Syncing`.
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing(_))
    }
}

impl PartialEq for SyncState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SyncState::Synced, SyncState::Synced) => true,
            (SyncState::NotSynced(_), SyncState::NotSynced(_)) => true,
            (SyncState::Syncing(a), SyncState::Syncing(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState::NotSynced(NotSyncedReason::NotStarted)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Synced => write!(f, "synced"),
            SyncState::NotSynced(reason) => write!(f, "not synced ({})", reason),
            SyncState::Syncing(Some(p)) => write!(f, "syncing ({:.0}%)", p * 100.0),
            SyncState::Syncing(None) => write!(f, "syncing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syncing_equality_by_progress() {
        assert_eq!(SyncState::Syncing(Some(0.5)), SyncState::Syncing(Some(0.5)));
        assert_ne!(SyncState::Syncing(Some(0.5)), SyncState::Syncing(Some(0.6)));
        assert_ne!(SyncState::Syncing(None), SyncState::Syncing(Some(0.0)));
        assert_eq!(SyncState::Syncing(None), SyncState::Syncing(None));
    }

    #[test]
    fn test_not_synced_ignores_reason() {
        let a = SyncState::NotSynced(NotSyncedReason::NoConnection);
        let b = SyncState::NotSynced(NotSyncedReason::Remote("nonce too low".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_variants_differ() {
        assert_ne!(SyncState::Synced, SyncState::Syncing(None));
        assert_ne!(SyncState::Synced, SyncState::default());
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(
            SyncState::syncing_with_progress(1.7),
            SyncState::Syncing(Some(1.0))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SyncState::Synced.to_string(), "synced");
        assert_eq!(
            SyncState::syncing_with_progress(0.25).to_string(),
            "syncing (25%)"
        );
    }
}
