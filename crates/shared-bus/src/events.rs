//! # Update Categories
//!
//! Names the independent state categories a light client publishes.

use std::fmt;

/// A state category with its own update stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateCategory {
    /// Last block height.
    Height,
    /// Account balance.
    Balance,
    /// Sync status.
    SyncState,
    /// Transaction history.
    Transactions,
}

impl UpdateCategory {
    /// All categories, in a stable order.
    pub const ALL: [UpdateCategory; 4] = [
        UpdateCategory::Height,
        UpdateCategory::Balance,
        UpdateCategory::SyncState,
        UpdateCategory::Transactions,
    ];

    /// Short label used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateCategory::Height => "height",
            UpdateCategory::Balance => "balance",
            UpdateCategory::SyncState => "sync_state",
            UpdateCategory::Transactions => "transactions",
        }
    }
}

impl fmt::Display for UpdateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
