//! # Configuration

use serde::{Deserialize, Serialize};
use shared_types::U256;

/// Transaction pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Gas limit reported for a send without a recipient contract to
    /// simulate against.
    pub default_gas_limit: u64,
    /// Amount substituted for a zero value in estimation calls only.
    pub estimate_placeholder_value: U256,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            default_gas_limit: 21_000,
            estimate_placeholder_value: U256::one(),
        }
    }
}

impl TransactionConfig {
    /// Create config for testing (local dev chain id).
    pub fn for_testing() -> Self {
        Self {
            chain_id: 1337,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransactionConfig::default();
        assert_eq!(config.default_gas_limit, 21_000);
        assert_eq!(config.estimate_placeholder_value, U256::one());
        assert_eq!(TransactionConfig::for_testing().chain_id, 1337);
    }
}
