//! # Codec Configuration
//!
//! Bounds applied while decoding untrusted input.

use serde::{Deserialize, Serialize};

/// Decoder limits.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RlpConfig {
    /// Maximum list nesting depth. The top-level item is depth 0.
    pub max_depth: usize,

    /// Largest length any single prefix may declare, in bytes.
    pub max_payload: usize,

    /// Reject integers carrying leading zero bytes.
    ///
    /// Length prefixes are always strict; this flag only governs numeric
    /// interpretation of byte strings (`RlpNode::as_u64` and friends).
    pub strict_integers: bool,
}

impl Default for RlpConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_payload: 16 * 1024 * 1024,
            strict_integers: false,
        }
    }
}

impl RlpConfig {
    /// Create a config for testing (small bounds, strict integers).
    pub fn for_testing() -> Self {
        Self {
            max_depth: 8,
            max_payload: 4 * 1024,
            strict_integers: true,
        }
    }
}
