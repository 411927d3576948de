//! # Integration Tests
//!
//! End-to-end contract query flows over the in-memory adapters.

pub mod query_flows;
pub mod reentrancy;
