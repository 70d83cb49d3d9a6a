//! # Syncer Configuration
//!
//! Timing knobs shared by both providers, and the provider selection.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider timing configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncerConfig {
    /// Delay between successful polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// First retry delay after a failed poll.
    pub backoff_base_ms: u64,

    /// Cap on the retry delay after repeated failed polls.
    pub backoff_max_ms: u64,

    /// First reconnect delay after the socket drops (before jitter).
    pub reconnect_base_ms: u64,

    /// Cap on the reconnect delay (before jitter).
    pub reconnect_max_ms: u64,

    /// Give up on a single remote call after this long.
    pub request_timeout_ms: u64,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 15_000,
            backoff_base_ms: 2_000,
            backoff_max_ms: 120_000,
            reconnect_base_ms: 1_000,
            reconnect_max_ms: 60_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl SyncerConfig {
    /// Create a config for testing (short delays).
    pub fn for_testing() -> Self {
        Self {
            poll_interval_ms: 1_000,
            backoff_base_ms: 100,
            backoff_max_ms: 800,
            reconnect_base_ms: 100,
            reconnect_max_ms: 800,
            request_timeout_ms: 5_000,
        }
    }

    /// Delay between successful polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// First poll retry delay.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Poll retry delay cap.
    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// First reconnect delay.
    pub fn reconnect_base(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_ms)
    }

    /// Reconnect delay cap.
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }

    /// Per-call timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Which provider drives the client. Resolved once, at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Discrete remote calls on an interval.
    Polling {
        /// Provider endpoint, for logs.
        endpoint: String,
    },
    /// One long-lived bidirectional connection.
    Socket {
        /// Provider endpoint, for logs.
        endpoint: String,
    },
}

impl ProviderConfig {
    /// Short provider name.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Polling { .. } => "polling",
            ProviderConfig::Socket { .. } => "socket",
        }
    }

    /// Configured endpoint.
    pub fn endpoint(&self) -> &str {
        match self {
            ProviderConfig::Polling { endpoint } | ProviderConfig::Socket { endpoint } => endpoint,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Polling {
            endpoint: "http://127.0.0.1:8545".to_string(),
        }
    }
}
