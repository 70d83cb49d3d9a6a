//! # Ports Layer
//!
//! The state machine is driven through its own inherent API; the only
//! port is outbound persistence.

pub mod outbound;

pub use outbound::{InMemoryStateStorage, StateStorage, StoredAccount};
