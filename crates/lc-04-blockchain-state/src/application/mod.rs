//! # Application Layer
//!
//! The state machine service.

pub mod state_machine;

pub use state_machine::BlockchainStateMachine;
