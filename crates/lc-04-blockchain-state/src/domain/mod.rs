//! # Domain Layer
//!
//! Transaction history and errors. `AccountState` and `SyncState` come from
//! `shared-types`.

pub mod errors;
pub mod transactions;

pub use errors::StateError;
pub use transactions::TransactionSet;
