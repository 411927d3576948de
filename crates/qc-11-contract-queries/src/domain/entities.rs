//! # Core Domain Entities
//!
//! Metadata records served by the simple read endpoints.

use crate::domain::value_objects::{Address, Bytes, CodeId, Hash};
use serde::{Deserialize, Serialize};

// =============================================================================
// CODE INFO
// =============================================================================

/// Metadata for a stored bytecode blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    /// Sequential code identifier.
    pub code_id: CodeId,
    /// SHA-256 checksum of the bytecode.
    pub code_hash: Hash,
    /// Account that uploaded the code.
    pub creator: Address,
}

// =============================================================================
// CONTRACT INFO
// =============================================================================

/// Metadata for an instantiated contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Contract address.
    pub address: Address,
    /// Account that instantiated (and may migrate) the contract.
    pub owner: Address,
    /// Code the contract runs.
    pub code_id: CodeId,
    /// Instantiation message, kept verbatim.
    pub init_msg: Bytes,
    /// Whether the owner may migrate the contract to new code.
    pub migratable: bool,
}

// =============================================================================
// MODULE PARAMETERS
// =============================================================================

/// Module parameter record returned by the `parameters` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Maximum accepted bytecode size in bytes.
    pub max_contract_size: u64,
    /// Maximum gas a transactional contract call may use.
    pub max_contract_gas: u64,
    /// Maximum size of a contract message in bytes.
    pub max_contract_msg_size: u64,
}

impl Params {
    /// 500 KiB.
    pub const DEFAULT_MAX_CONTRACT_SIZE: u64 = 500 * 1024;
    /// Default transactional contract gas ceiling.
    pub const DEFAULT_MAX_CONTRACT_GAS: u64 = 20_000_000;
    /// 1 KiB.
    pub const DEFAULT_MAX_CONTRACT_MSG_SIZE: u64 = 1024;
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_contract_size: Self::DEFAULT_MAX_CONTRACT_SIZE,
            max_contract_gas: Self::DEFAULT_MAX_CONTRACT_GAS,
            max_contract_msg_size: Self::DEFAULT_MAX_CONTRACT_MSG_SIZE,
        }
    }
}

// =============================================================================
// STORAGE MODEL
// =============================================================================

/// A single key/value pair in a contract's storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Raw storage key.
    pub key: Bytes,
    /// Raw stored value.
    pub value: Bytes,
}

impl Model {
    /// Creates a model from anything byte-like.
    pub fn new(key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            key: Bytes::from_slice(key.as_ref()),
            value: Bytes::from_slice(value.as_ref()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
