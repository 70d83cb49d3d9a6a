//! # Adapters Layer

pub mod registry;

pub use registry::StateRegistry;
