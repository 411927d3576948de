//! # Driven Ports (SPI - Outbound)
//!
//! These are the interfaces the query layer depends on. External adapters
//! implement them to provide:
//! - Code, contract and parameter storage (the keeper)
//! - The bytecode interpreter (the VM)
//!
//! Both are synchronous: a query runs to completion on one worker thread.

use crate::domain::context::ExecutionContext;
use crate::domain::entities::{CodeInfo, ContractInfo, Params};
use crate::domain::value_objects::{Address, Bytes, CodeId, Hash};
use crate::errors::{KeeperError, VmError};
use crate::ports::inbound::ContractQuerier;

// =============================================================================
// STORAGE READER
// =============================================================================

/// Read access to contract-managed storage.
pub trait StorageReader: Send + Sync {
    /// Value stored under `key` in `contract`'s storage, if any.
    fn get(&self, contract: &Address, key: &[u8]) -> Option<Bytes>;
}

// =============================================================================
// CONTRACT KEEPER
// =============================================================================

/// Interface to the code/contract store.
pub trait ContractKeeper: StorageReader {
    /// Raw bytecode of a stored code.
    ///
    /// # Errors
    ///
    /// [`KeeperError::CodeNotFound`] if nothing is stored under `code_id`.
    fn get_byte_code(&self, code_id: CodeId) -> Result<Bytes, KeeperError>;

    /// Metadata of a stored code.
    ///
    /// # Errors
    ///
    /// [`KeeperError::CodeNotFound`] if nothing is stored under `code_id`.
    fn get_code_info(&self, code_id: CodeId) -> Result<CodeInfo, KeeperError>;

    /// Metadata of an instantiated contract.
    ///
    /// # Errors
    ///
    /// [`KeeperError::ContractNotFound`] if no contract lives at `address`.
    fn get_contract_info(&self, address: &Address) -> Result<ContractInfo, KeeperError>;

    /// Current module parameters.
    fn get_params(&self) -> Params;

    /// Direct key lookup in a contract's storage. Absent keys yield empty bytes.
    fn query_raw_store(&self, contract: &Address, key: &[u8]) -> Bytes {
        self.get(contract, key).unwrap_or_default()
    }
}

// =============================================================================
// CONTRACT VM
// =============================================================================

/// Everything the VM needs for one contract-code query.
pub struct ContractCall<'a> {
    /// Contract being queried.
    pub contract: Address,
    /// Checksum of the code the contract runs.
    pub code_hash: Hash,
    /// Query message, as produced by the contract's schema.
    pub msg: &'a [u8],
    /// Call-tree context: VM slot and the gas meter to charge.
    pub ctx: &'a mut ExecutionContext,
    /// Storage visible to the contract.
    pub storage: &'a dyn StorageReader,
    /// Entry point for nested queries. Callers pass `ctx` back in.
    pub querier: &'a dyn ContractQuerier,
}

/// Black-box interpreter: executes code against an input under the context's
/// gas budget.
///
/// Implementations must charge every computational step to
/// `call.ctx.gas_meter_mut()` and return [`VmError::OutOfGas`] as soon as the
/// meter refuses a charge. A panic is tolerated and reported as an internal
/// fault by the invoker, but it is never the intended signalling path.
pub trait ContractVm: Send + Sync {
    /// Runs a read-only query against the contract.
    ///
    /// # Errors
    ///
    /// See [`VmError`].
    fn query(&self, call: ContractCall<'_>) -> Result<Bytes, VmError>;
}
