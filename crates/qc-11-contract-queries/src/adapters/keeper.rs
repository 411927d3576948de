//! # In-Memory Keeper
//!
//! Code, contract and storage tables held in memory.
//! Production deployments back [`ContractKeeper`] with the state database;
//! this adapter serves tests, benchmarks and local tooling.

use crate::domain::entities::{CodeInfo, ContractInfo, Model, Params};
use crate::domain::services::{code_checksum, compute_contract_address};
use crate::domain::value_objects::{Address, Bytes, CodeId};
use crate::errors::{KeeperError, UploadError};
use crate::ports::outbound::{ContractKeeper, StorageReader};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug)]
struct StoredCode {
    info: CodeInfo,
    byte_code: Bytes,
}

#[derive(Debug, Default)]
struct Sequences {
    last_code_id: u64,
    last_instance_id: u64,
}

/// Keeper backed by in-memory maps.
#[derive(Debug, Default)]
pub struct InMemoryKeeper {
    codes: RwLock<HashMap<CodeId, StoredCode>>,
    contracts: RwLock<HashMap<Address, ContractInfo>>,
    stores: RwLock<HashMap<Address, BTreeMap<Vec<u8>, Bytes>>>,
    params: RwLock<Params>,
    sequences: RwLock<Sequences>,
}

impl InMemoryKeeper {
    /// Creates an empty keeper with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty keeper with the given parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            params: RwLock::new(params),
            ..Self::default()
        }
    }

    /// Replaces the module parameters.
    pub fn set_params(&self, params: Params) {
        *self.params.write() = params;
    }

    /// Stores bytecode and returns its freshly assigned id. Ids start at 1.
    ///
    /// # Errors
    ///
    /// [`UploadError::CodeTooLarge`] if the code exceeds `max_contract_size`.
    pub fn store_code(&self, creator: Address, code: &[u8]) -> Result<CodeId, UploadError> {
        let max = self.params.read().max_contract_size;
        if code.len() as u64 > max {
            return Err(UploadError::CodeTooLarge {
                size: code.len(),
                max,
            });
        }

        let code_id = {
            let mut seq = self.sequences.write();
            seq.last_code_id += 1;
            CodeId(seq.last_code_id)
        };
        let info = CodeInfo {
            code_id,
            code_hash: code_checksum(code),
            creator,
        };
        debug!(code_id = %code_id, code_hash = %info.code_hash, size = code.len(), "Stored code");

        self.codes.write().insert(
            code_id,
            StoredCode {
                info,
                byte_code: Bytes::from_slice(code),
            },
        );
        Ok(code_id)
    }

    /// Instantiates a contract from stored code and returns its address.
    ///
    /// # Errors
    ///
    /// [`KeeperError::CodeNotFound`] if `code_id` is unknown.
    pub fn instantiate_contract(
        &self,
        code_id: CodeId,
        owner: Address,
        init_msg: &[u8],
        migratable: bool,
    ) -> Result<Address, KeeperError> {
        if !self.codes.read().contains_key(&code_id) {
            return Err(KeeperError::CodeNotFound(code_id));
        }

        let instance_id = {
            let mut seq = self.sequences.write();
            seq.last_instance_id += 1;
            seq.last_instance_id
        };
        let address = compute_contract_address(code_id, instance_id);
        debug!(contract = %address, code_id = %code_id, "Instantiated contract");

        self.contracts.write().insert(
            address,
            ContractInfo {
                address,
                owner,
                code_id,
                init_msg: Bytes::from_slice(init_msg),
                migratable,
            },
        );
        self.stores.write().entry(address).or_default();
        Ok(address)
    }

    /// Writes `models` into a contract's storage, overwriting existing keys.
    ///
    /// # Errors
    ///
    /// [`KeeperError::ContractNotFound`] if no contract lives at `contract`.
    pub fn set_contract_store(
        &self,
        contract: &Address,
        models: &[Model],
    ) -> Result<(), KeeperError> {
        if !self.contracts.read().contains_key(contract) {
            return Err(KeeperError::ContractNotFound(*contract));
        }
        let mut stores = self.stores.write();
        let store = stores.entry(*contract).or_default();
        for model in models {
            store.insert(model.key.as_slice().to_vec(), model.value.clone());
        }
        Ok(())
    }

    /// All key/value pairs of a contract's storage in key order.
    #[must_use]
    pub fn contract_state(&self, contract: &Address) -> Vec<Model> {
        self.stores
            .read()
            .get(contract)
            .map(|store| {
                store
                    .iter()
                    .map(|(key, value)| Model::new(key, value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl StorageReader for InMemoryKeeper {
    fn get(&self, contract: &Address, key: &[u8]) -> Option<Bytes> {
        self.stores.read().get(contract)?.get(key).cloned()
    }
}

impl ContractKeeper for InMemoryKeeper {
    fn get_byte_code(&self, code_id: CodeId) -> Result<Bytes, KeeperError> {
        self.codes
            .read()
            .get(&code_id)
            .map(|stored| stored.byte_code.clone())
            .ok_or(KeeperError::CodeNotFound(code_id))
    }

    fn get_code_info(&self, code_id: CodeId) -> Result<CodeInfo, KeeperError> {
        self.codes
            .read()
            .get(&code_id)
            .map(|stored| stored.info.clone())
            .ok_or(KeeperError::CodeNotFound(code_id))
    }

    fn get_contract_info(&self, address: &Address) -> Result<ContractInfo, KeeperError> {
        self.contracts
            .read()
            .get(address)
            .cloned()
            .ok_or(KeeperError::ContractNotFound(*address))
    }

    fn get_params(&self) -> Params {
        *self.params.read()
    }
}

// =============================================================================
// TESTS
// =============================================================================
