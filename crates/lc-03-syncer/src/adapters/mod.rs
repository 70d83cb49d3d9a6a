//! # Adapters
//!
//! The two concrete providers. Both share `Session` for sink handling,
//! single-flight refreshes and sync-state reporting.

mod polling;
mod session;
mod socket;

pub use polling::PollingSyncer;
pub use socket::SocketSyncer;
