//! # Domain Module
//!
//! Block header entity, positional field access and errors.

pub mod errors;
pub mod fields;
pub mod header;

pub use errors::*;
pub use fields::Fields;
pub use header::*;
