//! # Algorithms
//!
//! Pure helpers shared by the providers.

pub mod backoff;
pub mod coalesce;
pub mod state_reporter;

pub use backoff::Backoff;
pub use coalesce::{FlightGuard, Generation, InFlight};
pub use state_reporter::SyncStateReporter;
