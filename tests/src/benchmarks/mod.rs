//! # Quantum-Chain Benchmarks
//!
//! Performance benchmarks per subsystem.
//! All benchmarks are "brutal" stress tests.

pub mod qc_11_contract_queries;
