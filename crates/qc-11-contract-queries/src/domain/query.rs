//! # Query Model
//!
//! Wire request (`path` + JSON `data`) and the typed query it decodes into.

use crate::domain::value_objects::{Address, Bytes, CodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Endpoint tags carried in [`QueryRequest::path`].
pub mod endpoints {
    /// Raw bytecode by code id.
    pub const BYTE_CODE: &str = "bytecode";
    /// Code metadata by code id.
    pub const CODE_INFO: &str = "codeInfo";
    /// Contract metadata by address.
    pub const CONTRACT_INFO: &str = "contractInfo";
    /// Single key lookup in contract storage.
    pub const RAW_STORE: &str = "rawStore";
    /// Contract-code query.
    pub const CONTRACT_STORE: &str = "contractStore";
    /// Module parameters.
    pub const PARAMETERS: &str = "parameters";
}

// =============================================================================
// WIRE REQUEST
// =============================================================================

/// A query as it arrives at the router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Endpoint tag, see [`endpoints`].
    pub path: String,
    /// JSON-encoded parameter record for the endpoint.
    pub data: Vec<u8>,
}

impl QueryRequest {
    /// Creates a request from an endpoint and pre-encoded parameters.
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Encodes a typed query into its wire form.
    ///
    /// # Errors
    ///
    /// Fails only if the parameter record cannot be serialized.
    pub fn from_query(query: &Query) -> Result<Self, serde_json::Error> {
        let data = match query {
            Query::ByteCode { code_id } | Query::CodeInfo { code_id } => {
                serde_json::to_vec(&CodeIdParams { code_id: *code_id })?
            }
            Query::ContractInfo { contract_address } => {
                serde_json::to_vec(&ContractAddressParams {
                    contract_address: *contract_address,
                })?
            }
            Query::RawStore {
                contract_address,
                key,
            } => serde_json::to_vec(&RawStoreParams {
                contract_address: *contract_address,
                key: key.clone(),
            })?,
            Query::ContractStore {
                contract_address,
                msg,
            } => serde_json::to_vec(&ContractStoreParams {
                contract_address: *contract_address,
                msg: msg.clone(),
            })?,
            Query::Params => Vec::new(),
        };
        Ok(Self::new(query.endpoint(), data))
    }
}

// =============================================================================
// PARAMETER RECORDS
// =============================================================================

/// Parameters of the `bytecode` and `codeInfo` endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIdParams {
    /// Code to look up.
    pub code_id: CodeId,
}

/// Parameters of the `contractInfo` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddressParams {
    /// Contract to look up.
    pub contract_address: Address,
}

/// Parameters of the `rawStore` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStoreParams {
    /// Contract whose storage is read.
    pub contract_address: Address,
    /// Storage key, hex encoded on the wire.
    pub key: Bytes,
}

/// Parameters of the `contractStore` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStoreParams {
    /// Contract to query.
    pub contract_address: Address,
    /// Contract-defined query message.
    pub msg: serde_json::Value,
}

// =============================================================================
// TYPED QUERY
// =============================================================================

/// Query kinds understood by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// Raw bytecode of a stored code.
    ByteCode {
        /// Code to fetch.
        code_id: CodeId,
    },
    /// Metadata of a stored code.
    CodeInfo {
        /// Code to describe.
        code_id: CodeId,
    },
    /// Metadata of an instantiated contract.
    ContractInfo {
        /// Contract to describe.
        contract_address: Address,
    },
    /// Unmetered single key lookup.
    RawStore {
        /// Contract whose storage is read.
        contract_address: Address,
        /// Key to read.
        key: Bytes,
    },
    /// Gas-metered invocation of contract code.
    ContractStore {
        /// Contract to query.
        contract_address: Address,
        /// Contract-defined query message.
        msg: serde_json::Value,
    },
    /// Module parameters.
    Params,
}

impl Query {
    /// Endpoint tag of this query kind.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::ByteCode { .. } => endpoints::BYTE_CODE,
            Self::CodeInfo { .. } => endpoints::CODE_INFO,
            Self::ContractInfo { .. } => endpoints::CONTRACT_INFO,
            Self::RawStore { .. } => endpoints::RAW_STORE,
            Self::ContractStore { .. } => endpoints::CONTRACT_STORE,
            Self::Params => endpoints::PARAMETERS,
        }
    }

    /// Convenience constructor for a contract-code query.
    #[must_use]
    pub fn contract_store(contract_address: Address, msg: serde_json::Value) -> Self {
        Self::ContractStore {
            contract_address,
            msg,
        }
    }

    /// Convenience constructor for a raw storage read.
    pub fn raw_store(contract_address: Address, key: impl AsRef<[u8]>) -> Self {
        Self::RawStore {
            contract_address,
            key: Bytes::from_slice(key.as_ref()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

// =============================================================================
// TESTS
// =============================================================================
