//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for contract query execution.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ContractQueryApi`, `ContractQuerier`
//! - **Driven Ports (Outbound)**: `ContractKeeper`, `StorageReader`, `ContractVm`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
