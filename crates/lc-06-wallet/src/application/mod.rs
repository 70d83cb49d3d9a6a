//! # Application Layer

pub mod wallet;

pub use wallet::{LightWallet, WalletBuilder};
