//! # Domain Module
//!
//! Codec data model and errors.

pub mod errors;
pub mod node;

pub use errors::*;
pub use node::*;
