//! # Application Layer
//!
//! Provider selection.

pub mod provider;

pub use provider::{build_syncer, Transports};
