//! # Domain Layer
//!
//! Provider-independent records, typed remote calls and errors.

pub mod entities;
pub mod errors;
pub mod rpc;

pub use entities::*;
pub use errors::*;
pub use rpc::*;
