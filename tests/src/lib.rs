//! # Secrets Connector Test Suite
//!
//! Unified test crate for flows that cross component boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (envelope signing, full request path)
//! └── src/
//!     └── integration/  # Gateway ─► handler ─► storage ─► gateway round trips
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # With handler logs
//! RUST_LOG=qc_18_secrets_connector=debug cargo test -p qc-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
