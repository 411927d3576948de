//! # Driving Ports (API - Inbound)
//!
//! These are the interfaces exposed by the query subsystem.
//!
//! - [`ContractQueryApi`]: async entry point for external callers
//!   (API gateway, light clients).
//! - [`ContractQuerier`]: synchronous re-entry point for contract code that
//!   issues a nested query during its own execution.

use crate::domain::context::ExecutionContext;
use crate::domain::entities::{CodeInfo, ContractInfo, Params};
use crate::domain::query::{Query, QueryRequest};
use crate::domain::value_objects::{Address, Bytes, CodeId};
use crate::errors::QueryError;
use async_trait::async_trait;

// =============================================================================
// NESTED QUERIES
// =============================================================================

/// Re-entry point for queries issued by running contract code.
///
/// The caller passes the context it was invoked with; implementations must
/// reuse it rather than allocating a new one.
pub trait ContractQuerier: Send + Sync {
    /// Routes `query` within the caller's call tree.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`]; the calling contract decides how to surface it.
    fn query(&self, ctx: &mut ExecutionContext, query: &Query) -> Result<Bytes, QueryError>;
}

// =============================================================================
// EXTERNAL API
// =============================================================================

/// Primary API for read-only contract queries.
#[async_trait]
pub trait ContractQueryApi: Send + Sync {
    /// Serves one top-level query in wire form.
    ///
    /// Returns the endpoint's response bytes: indented JSON for metadata
    /// endpoints, raw bytes for `rawStore` and `contractStore`.
    async fn handle_query(&self, request: QueryRequest) -> Result<Bytes, QueryError>;

    /// Serves one top-level typed query.
    async fn query(&self, query: Query) -> Result<Bytes, QueryError> {
        let request = QueryRequest::from_query(&query)
            .map_err(|e| QueryError::MalformedRequest(e.to_string()))?;
        self.handle_query(request).await
    }

    /// Invokes contract code with `msg` and returns its output.
    async fn contract_store(
        &self,
        contract_address: Address,
        msg: serde_json::Value,
    ) -> Result<Bytes, QueryError> {
        self.query(Query::contract_store(contract_address, msg)).await
    }

    /// Reads a single key from contract storage.
    async fn raw_store(&self, contract_address: Address, key: &[u8]) -> Result<Bytes, QueryError> {
        self.query(Query::raw_store(contract_address, key)).await
    }

    /// Fetches raw bytecode.
    async fn byte_code(&self, code_id: CodeId) -> Result<Bytes, QueryError> {
        let bz = self.query(Query::ByteCode { code_id }).await?;
        decode_response(&bz)
    }

    /// Fetches code metadata.
    async fn code_info(&self, code_id: CodeId) -> Result<CodeInfo, QueryError> {
        let bz = self.query(Query::CodeInfo { code_id }).await?;
        decode_response(&bz)
    }

    /// Fetches contract metadata.
    async fn contract_info(&self, contract_address: Address) -> Result<ContractInfo, QueryError> {
        let bz = self.query(Query::ContractInfo { contract_address }).await?;
        decode_response(&bz)
    }

    /// Fetches module parameters.
    async fn params(&self) -> Result<Params, QueryError> {
        let bz = self.query(Query::Params).await?;
        decode_response(&bz)
    }
}

fn decode_response<T: serde::de::DeserializeOwned>(bz: &Bytes) -> Result<T, QueryError> {
    serde_json::from_slice(bz.as_slice()).map_err(|e| QueryError::EncodingFailure(e.to_string()))
}
