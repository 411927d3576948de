//! # Quantum-Chain Test Suite
//!
//! Unified test crate for the contract query subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Performance tests
//! │   └── qc_11_contract_queries.rs
//! │
//! └── integration/      # End-to-end query flows
//!     ├── query_flows.rs
//!     └── reentrancy.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::query_flows::
//! cargo test -p qc-tests integration::reentrancy::
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

pub mod benchmarks;
pub mod integration;
