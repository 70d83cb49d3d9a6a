//! # Wallet Configuration
//!
//! Aggregates every subsystem's configuration. Loaded from JSON or built
//! in code, then adjusted from `LC_*` environment variables.

use lc_01_rlp_codec::RlpConfig;
use lc_03_syncer::{ProviderConfig, SyncerConfig};
use lc_04_blockchain_state::StateConfig;
use lc_05_transactions::{TransactionConfig, MAX_CHAIN_ID};
use serde::{Deserialize, Serialize};
use shared_types::NetworkId;
use thiserror::Error;
use tracing::{info, warn};

/// Chain id override.
pub const ENV_CHAIN_ID: &str = "LC_CHAIN_ID";
/// Poll interval override, in seconds.
pub const ENV_POLL_INTERVAL_SECS: &str = "LC_POLL_INTERVAL_SECS";
/// Per-stream buffer override.
pub const ENV_STREAM_CAPACITY: &str = "LC_STREAM_CAPACITY";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Signatures would be bound to a different chain than the one tracked.
    #[error("Chain id {chain_id} does not match network {network}")]
    ChainIdMismatch {
        /// Configured signing chain id.
        chain_id: u64,
        /// Configured network.
        network: NetworkId,
    },

    /// A numeric setting is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The provider endpoint is empty.
    #[error("Provider endpoint is empty")]
    EmptyEndpoint,

    /// The JSON document could not be parsed.
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Complete wallet configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Network the wallet is attached to.
    pub network: NetworkId,
    /// Which provider to run.
    pub provider: ProviderConfig,
    /// Provider timing.
    pub syncer: SyncerConfig,
    /// Codec limits.
    pub rlp: RlpConfig,
    /// State machine tunables.
    pub state: StateConfig,
    /// Signing and estimation.
    pub transactions: TransactionConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::MAINNET,
            provider: ProviderConfig::default(),
            syncer: SyncerConfig::default(),
            rlp: RlpConfig::default(),
            state: StateConfig::default(),
            transactions: TransactionConfig::default(),
        }
    }
}

impl WalletConfig {
    /// Create config for testing (dev chain, short timings).
    pub fn for_testing() -> Self {
        Self {
            network: NetworkId::DEV,
            provider: ProviderConfig::default(),
            syncer: SyncerConfig::for_testing(),
            rlp: RlpConfig::for_testing(),
            state: StateConfig::for_testing(),
            transactions: TransactionConfig::for_testing(),
        }
    }

    /// Parse from JSON; missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Check that the pieces fit together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transactions.chain_id > MAX_CHAIN_ID {
            return Err(invalid("chain_id", "too large for an EIP-155 signature"));
        }
        if self.transactions.chain_id != self.network.chain_id() {
            return Err(ConfigError::ChainIdMismatch {
                chain_id: self.transactions.chain_id,
                network: self.network,
            });
        }
        if self.provider.endpoint().trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.syncer.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be positive"));
        }
        if self.syncer.backoff_base_ms > self.syncer.backoff_max_ms {
            return Err(invalid("backoff_base_ms", "exceeds backoff_max_ms"));
        }
        if self.syncer.reconnect_base_ms > self.syncer.reconnect_max_ms {
            return Err(invalid("reconnect_base_ms", "exceeds reconnect_max_ms"));
        }
        if self.state.stream_capacity == 0 {
            return Err(invalid("stream_capacity", "must be positive"));
        }
        if self.rlp.max_depth == 0 {
            return Err(invalid("max_depth", "must be positive"));
        }
        Ok(())
    }

    /// Apply `LC_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(chain_id) = parse::<u64>(&lookup, ENV_CHAIN_ID) {
            self.network = NetworkId(chain_id);
            self.transactions.chain_id = chain_id;
            info!(chain_id, "[lc-06] chain id from environment");
        }
        if let Some(secs) = parse::<u64>(&lookup, ENV_POLL_INTERVAL_SECS) {
            self.syncer.poll_interval_ms = secs.saturating_mul(1000);
            info!(secs, "[lc-06] poll interval from environment");
        }
        if let Some(capacity) = parse::<usize>(&lookup, ENV_STREAM_CAPACITY) {
            self.state.stream_capacity = capacity;
            info!(capacity, "[lc-06] stream capacity from environment");
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "[lc-06] ignoring unparseable override");
            None
        }
    }
}
