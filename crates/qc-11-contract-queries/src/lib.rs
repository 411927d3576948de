//! # QC-11 Contract Queries - Read-Only Contract Query Execution
//!
//! **Subsystem ID:** 11
//!
//! ## Purpose
//!
//! Serves structured read-only queries against deployed contracts and
//! contract-managed storage. Queries that run contract code are bounded by a
//! gas budget, and every abnormal termination (gas exhaustion, interpreter
//! fault, panic) comes back to the caller as a typed [`QueryError`].
//! Contract code may issue nested queries while it runs; those re-enter the
//! router with the caller's execution context.
//!
//! ## Endpoints
//!
//! | Path | Parameters | Response |
//! |------|------------|----------|
//! | `bytecode` | `{"code_id"}` | JSON hex string of the bytecode |
//! | `codeInfo` | `{"code_id"}` | JSON [`CodeInfo`](domain::CodeInfo) |
//! | `contractInfo` | `{"contract_address"}` | JSON [`ContractInfo`](domain::ContractInfo) |
//! | `rawStore` | `{"contract_address", "key"}` | raw stored bytes, empty if absent |
//! | `contractStore` | `{"contract_address", "msg"}` | raw contract output |
//! | `parameters` | ignored | JSON [`Params`](domain::Params) |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One execution context per query call tree | `domain/context.rs` - `ReentrancyTracker::prepare()` |
//! | Slots rotate `(n + 1) mod pool` atomically | `domain/context.rs` - `ReentrancyTracker::allocate_slot()` |
//! | Gas exhaustion reports `consumed >= limit` | `domain/gas.rs` - `GasMeter::consume()` |
//! | No fault escapes a query | `invoker.rs` - `ContractInvoker::invoke()` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Router | `router.rs` | Dispatch by query kind |
//! | Invoker | `invoker.rs` | Fault boundary around the VM port |
//! | Codec | `codec.rs` | JSON request decode / response encode |
//! | Keeper | `adapters/keeper.rs` | In-memory code/contract store |
//! | Native VM | `adapters/native_vm.rs` | Slot-pooled VM for native contracts |
//! | Service | `service.rs` | Async worker dispatch, stats, logging |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_11_contract_queries::prelude::*;
//!
//! let service = ContractQueryService::new(keeper, vm, QueryConfig::from_env());
//! let output = service
//!     .contract_store(contract, serde_json::json!({ "verifier": {} }))
//!     .await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod invoker;
pub mod metrics;
pub mod ports;
pub mod router;
pub mod service;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use errors::QueryError;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::context::{
        ExecutionContext, PreparedContext, ReentrancyTracker, DEFAULT_VM_POOL_SIZE,
    };
    pub use crate::domain::entities::{CodeInfo, ContractInfo, Model, Params};
    pub use crate::domain::gas::{costs, GasMeter, OutOfGas};
    pub use crate::domain::query::{endpoints, Query, QueryRequest};
    pub use crate::domain::value_objects::{Address, Bytes, CodeId, Hash, VmSlot};

    // Ports
    pub use crate::ports::inbound::{ContractQuerier, ContractQueryApi};
    pub use crate::ports::outbound::{ContractCall, ContractKeeper, ContractVm, StorageReader};

    // Errors
    pub use crate::errors::{
        GasError, KeeperError, QueryError, TelemetryError, UploadError, VmError,
    };

    // Core
    pub use crate::invoker::ContractInvoker;
    pub use crate::router::{GasReport, QueryOutcome, QueryRouter};

    // Adapters
    pub use crate::adapters::{ContractEnv, InMemoryKeeper, NativeContract, NativeVm};

    // Service
    pub use crate::config::QueryConfig;
    pub use crate::service::{create_test_service, ContractQueryService, QueryStats};
    pub use crate::telemetry::init_tracing;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 11;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Contract Queries";

// =============================================================================
// TESTS
// =============================================================================
