//! # Native VM
//!
//! [`ContractVm`] adapter that runs contracts written as Rust types instead
//! of interpreted bytecode. Each stored code checksum maps to one
//! [`NativeContract`]; the adapter keeps a fixed pool of VM slots and counts
//! invocations per slot.
//!
//! Contracts only see the world through [`ContractEnv`], which charges every
//! operation to the call tree's gas meter.

use crate::domain::context::{ExecutionContext, DEFAULT_VM_POOL_SIZE};
use crate::domain::gas::costs;
use crate::domain::query::Query;
use crate::domain::services::code_checksum;
use crate::domain::value_objects::{Address, Bytes, Hash, VmSlot};
use crate::errors::VmError;
use crate::ports::inbound::ContractQuerier;
use crate::ports::outbound::{ContractCall, ContractVm, StorageReader};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

// =============================================================================
// CONTRACT INTERFACE
// =============================================================================

/// A contract implemented natively.
pub trait NativeContract: Send + Sync {
    /// Answers a query message.
    ///
    /// # Errors
    ///
    /// [`VmError::OutOfGas`] when the environment refuses a charge (propagate
    /// it with `?`), [`VmError::Contract`] for a message the contract rejects.
    fn query(&self, env: &mut ContractEnv<'_>, msg: &[u8]) -> Result<Bytes, VmError>;
}

/// Host environment handed to a running [`NativeContract`].
pub struct ContractEnv<'a> {
    contract: Address,
    ctx: &'a mut ExecutionContext,
    storage: &'a dyn StorageReader,
    querier: &'a dyn ContractQuerier,
}

impl<'a> ContractEnv<'a> {
    fn new(call: ContractCall<'a>) -> Self {
        Self {
            contract: call.contract,
            ctx: call.ctx,
            storage: call.storage,
            querier: call.querier,
        }
    }

    /// Address of the running contract.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.contract
    }

    /// VM slot of the call tree.
    #[must_use]
    pub fn vm_slot(&self) -> VmSlot {
        self.ctx.vm_slot()
    }

    /// True when this frame runs beneath another contract frame.
    #[must_use]
    pub fn is_reentrant(&self) -> bool {
        self.ctx.reentrant()
    }

    /// Gas left in the call tree.
    #[must_use]
    pub fn gas_remaining(&self) -> u64 {
        self.ctx.gas_meter().remaining()
    }

    /// Charges `amount` gas.
    ///
    /// # Errors
    ///
    /// [`VmError::OutOfGas`] once the meter is past its limit.
    pub fn consume_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), VmError> {
        self.ctx.gas_meter_mut().consume(amount, descriptor)?;
        Ok(())
    }

    /// Gives back gas charged earlier in the call tree.
    ///
    /// # Errors
    ///
    /// [`VmError::Contract`] when `amount` exceeds what was consumed.
    pub fn refund_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), VmError> {
        self.ctx.gas_meter_mut().refund(amount, descriptor)?;
        Ok(())
    }

    /// Reads a key from this contract's storage.
    ///
    /// Costs a flat fee plus a per-byte fee on key and value.
    ///
    /// # Errors
    ///
    /// [`VmError::OutOfGas`].
    pub fn storage_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, VmError> {
        self.consume_gas(costs::STORAGE_READ_FLAT, "ReadFlat")?;
        let value = self.storage.get(&self.contract, key);
        let read_len = key.len() + value.as_ref().map_or(0, Bytes::len);
        self.consume_gas(
            costs::STORAGE_READ_BYTE.saturating_mul(read_len as u64),
            "ReadPerByte",
        )?;
        Ok(value)
    }

    /// Issues a nested query within the same call tree.
    ///
    /// # Errors
    ///
    /// The nested failure mapped to a [`VmError`]; gas exhaustion stays
    /// [`VmError::OutOfGas`].
    pub fn query(&mut self, query: &Query) -> Result<Bytes, VmError> {
        self.consume_gas(costs::NESTED_QUERY, "nested query")?;
        Ok(self.querier.query(&mut *self.ctx, query)?)
    }

    /// Queries another contract with a JSON message.
    ///
    /// # Errors
    ///
    /// See [`ContractEnv::query`].
    pub fn query_contract(
        &mut self,
        contract: Address,
        msg: serde_json::Value,
    ) -> Result<Bytes, VmError> {
        self.query(&Query::contract_store(contract, msg))
    }
}

// =============================================================================
// VM ADAPTER
// =============================================================================

/// Slot-pooled VM running registered native contracts.
pub struct NativeVm {
    contracts: RwLock<HashMap<Hash, Arc<dyn NativeContract>>>,
    slot_invocations: Vec<AtomicU64>,
}

impl NativeVm {
    /// Creates a VM with `pool_size` slots. Zero falls back to the default.
    #[must_use]
    pub fn new(pool_size: usize) -> Self {
        let pool_size = if pool_size == 0 {
            DEFAULT_VM_POOL_SIZE
        } else {
            pool_size
        };
        Self {
            contracts: RwLock::new(HashMap::new()),
            slot_invocations: (0..pool_size).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Binds `contract` to the checksum of `code` and returns the checksum.
    pub fn register(&self, code: &[u8], contract: Arc<dyn NativeContract>) -> Hash {
        let hash = code_checksum(code);
        self.contracts.write().insert(hash, contract);
        hash
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.slot_invocations.len()
    }

    /// Contract frames executed on `slot` so far.
    #[must_use]
    pub fn slot_invocations(&self, slot: VmSlot) -> u64 {
        self.slot_invocations
            .get(slot.index())
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }
}

impl Default for NativeVm {
    fn default() -> Self {
        Self::new(DEFAULT_VM_POOL_SIZE)
    }
}

impl ContractVm for NativeVm {
    fn query(&self, call: ContractCall<'_>) -> Result<Bytes, VmError> {
        let slot = call.ctx.vm_slot();
        let counter = self.slot_invocations.get(slot.index()).ok_or_else(|| {
            VmError::Internal(format!(
                "vm slot {slot} outside pool of {}",
                self.slot_invocations.len()
            ))
        })?;

        let contract = self
            .contracts
            .read()
            .get(&call.code_hash)
            .cloned()
            .ok_or_else(|| {
                VmError::Internal(format!(
                    "no native implementation for code {}",
                    call.code_hash
                ))
            })?;

        counter.fetch_add(1, Ordering::Relaxed);
        trace!(contract = %call.contract, vm_slot = %slot, "Running native contract");

        let msg = call.msg;
        let mut env = ContractEnv::new(call);
        env.consume_gas(costs::QUERY_BASE, "query base")?;
        env.consume_gas(
            costs::QUERY_MSG_BYTE.saturating_mul(msg.len() as u64),
            "query msg bytes",
        )?;
        contract.query(&mut env, msg)
    }
}

// =============================================================================
// TESTS
// =============================================================================
