//! # Lightchain Test Suite
//!
//! Cross-crate flows that no single crate can exercise on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # wallet, socket and codec flows
//! └── benches/           # codec and signing throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lc-tests
//!
//! # One flow
//! cargo test -p lc-tests integration::socket_flows::
//!
//! # Benchmarks
//! cargo bench -p lc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
