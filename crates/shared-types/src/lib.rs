//! # Shared Types Crate
//!
//! Types shared by all light-client subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: primitives (`Address`, `Hash`, `U256`) and
//!   the records passed between the syncer, the state machine and the
//!   transaction pipeline are defined here once.
//! - **No Ambient State**: nothing in this crate holds mutable global state;
//!   `AccountState` is owned by whichever component constructs it.

pub mod entities;
pub mod errors;
pub mod sync_state;

pub use entities::*;
pub use errors::*;
pub use sync_state::{NotSyncedReason, SyncState};
