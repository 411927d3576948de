//! # Error Types
//!
//! All error types for contract query execution.

use crate::domain::gas::OutOfGas;
use crate::domain::value_objects::{Address, CodeId};
use thiserror::Error;

// =============================================================================
// QUERY ERRORS
// =============================================================================

/// Faults reported to the caller of a query. Every variant terminates only
/// the query being served.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Request parameters failed to decode.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Response failed to encode.
    #[error("failed to encode response: {0}")]
    EncodingFailure(String),

    /// Unrecognized endpoint tag.
    #[error("unknown contract query endpoint: {endpoint}")]
    UnknownRequest { endpoint: String },

    /// Referenced code, contract or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Query gas budget exhausted during contract invocation.
    #[error("out of gas in location: {descriptor}; gasWanted: {limit}, gasUsed: {consumed}")]
    OutOfGas {
        descriptor: String,
        consumed: u64,
        limit: u64,
    },

    /// Unexpected failure inside the execution capability. The trace is for
    /// operators and is deliberately left out of the display form.
    #[error("internal fault: {message}")]
    InternalFault { message: String, trace: String },

    /// The contract rejected the query message.
    #[error("contract query failed: {0}")]
    ContractFailed(String),

    /// Nested queries went deeper than allowed.
    #[error("query depth exceeded: {depth} > {max}")]
    QueryDepthExceeded { depth: u32, max: u32 },
}

impl QueryError {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::EncodingFailure(_) => "encoding_failure",
            Self::UnknownRequest { .. } => "unknown_request",
            Self::NotFound(_) => "not_found",
            Self::OutOfGas { .. } => "out_of_gas",
            Self::InternalFault { .. } => "internal_fault",
            Self::ContractFailed(_) => "contract_failed",
            Self::QueryDepthExceeded { .. } => "depth_exceeded",
        }
    }

    /// Returns true for gas exhaustion.
    #[must_use]
    pub const fn is_out_of_gas(&self) -> bool {
        matches!(self, Self::OutOfGas { .. })
    }
}

impl From<OutOfGas> for QueryError {
    fn from(err: OutOfGas) -> Self {
        Self::OutOfGas {
            descriptor: err.descriptor,
            consumed: err.consumed,
            limit: err.limit,
        }
    }
}

impl From<KeeperError> for QueryError {
    fn from(err: KeeperError) -> Self {
        match err {
            KeeperError::CodeNotFound(_) | KeeperError::ContractNotFound(_) => {
                Self::NotFound(err.to_string())
            }
        }
    }
}

// =============================================================================
// VM ERRORS
// =============================================================================

/// Errors returned by the VM port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// The gas meter crossed its limit.
    #[error(transparent)]
    OutOfGas(#[from] OutOfGas),

    /// The contract returned an error for this message.
    #[error("contract error: {0}")]
    Contract(String),

    /// The interpreter itself failed.
    #[error("vm internal error: {0}")]
    Internal(String),
}

impl From<QueryError> for VmError {
    /// Nested query failures surface to the calling contract. Gas exhaustion
    /// stays gas exhaustion; everything else is the contract's problem.
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::OutOfGas {
                descriptor,
                consumed,
                limit,
            } => Self::OutOfGas(OutOfGas {
                descriptor,
                consumed,
                limit,
            }),
            other => Self::Contract(other.to_string()),
        }
    }
}

impl From<GasError> for VmError {
    /// A bad refund is a bug in the contract, not in the interpreter.
    fn from(err: GasError) -> Self {
        Self::Contract(err.to_string())
    }
}

// =============================================================================
// KEEPER ERRORS
// =============================================================================

/// Errors from the code/contract store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeeperError {
    /// No code stored under this id.
    #[error("code {0} not found")]
    CodeNotFound(CodeId),

    /// No contract at this address.
    #[error("contract {0} not found")]
    ContractNotFound(Address),
}

/// Rejected code uploads. Uploads are not a query path, so these never
/// become a [`QueryError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Upload exceeds the `max_contract_size` parameter.
    #[error("code size exceeded: {size} > {max} bytes")]
    CodeTooLarge { size: usize, max: u64 },
}

// =============================================================================
// GAS ERRORS
// =============================================================================

/// Misuse of the gas meter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GasError {
    /// Refund larger than what was consumed.
    #[error("gas refund underflow in {descriptor}: refund {amount} > consumed {consumed}")]
    RefundUnderflow {
        descriptor: String,
        amount: u64,
        consumed: u64,
    },
}

// =============================================================================
// TELEMETRY ERRORS
// =============================================================================

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

// =============================================================================
// TESTS
// =============================================================================
