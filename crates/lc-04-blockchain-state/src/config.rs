//! # Configuration
//!
//! Tunables for the state machine.

use serde::{Deserialize, Serialize};

/// State machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Undelivered updates buffered per stream before the oldest is dropped.
    pub stream_capacity: usize,
    /// Upper bound on a single page of transaction history.
    pub max_page_size: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            stream_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            max_page_size: 100,
        }
    }
}

impl StateConfig {
    /// Create config for testing (small buffers).
    pub fn for_testing() -> Self {
        Self {
            stream_capacity: 16,
            max_page_size: 10,
        }
    }
}
