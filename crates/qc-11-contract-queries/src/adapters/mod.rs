//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the driven ports.
//!
//! - [`InMemoryKeeper`]: code, contract and storage tables in memory
//! - [`NativeVm`]: slot-pooled VM running natively implemented contracts

pub mod keeper;
pub mod native_vm;

pub use keeper::*;
pub use native_vm::*;
