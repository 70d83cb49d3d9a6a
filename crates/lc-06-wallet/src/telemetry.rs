//! # Tracing Setup
//!
//! Installs a formatted subscriber filtered by `RUST_LOG`, falling back to
//! the given directive. Safe to call more than once.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed or `fallback` is
/// not a valid directive.
pub fn init_tracing(fallback: &str) -> bool {
    let filter = match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback)) {
        Ok(filter) => filter,
        Err(_) => return false,
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .try_init()
        .is_ok()
}
