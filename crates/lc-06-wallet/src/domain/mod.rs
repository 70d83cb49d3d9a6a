//! # Domain Layer

pub mod errors;

pub use errors::WalletError;
