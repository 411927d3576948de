//! # Result Codec
//!
//! JSON decode of wire requests into typed [`Query`] values and JSON encode
//! of metadata responses. Decode failures become
//! [`QueryError::MalformedRequest`]; encode failures become
//! [`QueryError::EncodingFailure`].

use crate::domain::query::{
    endpoints, CodeIdParams, ContractAddressParams, ContractStoreParams, Query, QueryRequest,
    RawStoreParams,
};
use crate::errors::QueryError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decodes a wire request into a typed query.
///
/// # Errors
///
/// [`QueryError::UnknownRequest`] for an unrecognized path,
/// [`QueryError::MalformedRequest`] when the parameters do not decode.
pub fn decode_request(request: &QueryRequest) -> Result<Query, QueryError> {
    match request.path.as_str() {
        endpoints::BYTE_CODE => {
            let params: CodeIdParams = decode_params(&request.data)?;
            Ok(Query::ByteCode {
                code_id: params.code_id,
            })
        }
        endpoints::CODE_INFO => {
            let params: CodeIdParams = decode_params(&request.data)?;
            Ok(Query::CodeInfo {
                code_id: params.code_id,
            })
        }
        endpoints::CONTRACT_INFO => {
            let params: ContractAddressParams = decode_params(&request.data)?;
            Ok(Query::ContractInfo {
                contract_address: params.contract_address,
            })
        }
        endpoints::RAW_STORE => {
            let params: RawStoreParams = decode_params(&request.data)?;
            Ok(Query::RawStore {
                contract_address: params.contract_address,
                key: params.key,
            })
        }
        endpoints::CONTRACT_STORE => {
            let params: ContractStoreParams = decode_params(&request.data)?;
            Ok(Query::ContractStore {
                contract_address: params.contract_address,
                msg: params.msg,
            })
        }
        // Takes no parameters; whatever was sent is ignored.
        endpoints::PARAMETERS => Ok(Query::Params),
        other => Err(QueryError::UnknownRequest {
            endpoint: other.to_string(),
        }),
    }
}

/// Decodes a JSON parameter record.
///
/// # Errors
///
/// [`QueryError::MalformedRequest`] with the decoder's message.
pub fn decode_params<T: DeserializeOwned>(data: &[u8]) -> Result<T, QueryError> {
    serde_json::from_slice(data).map_err(|e| QueryError::MalformedRequest(e.to_string()))
}

/// Encodes a response record as indented JSON.
///
/// # Errors
///
/// [`QueryError::EncodingFailure`] with the encoder's message.
pub fn encode_response<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, QueryError> {
    serde_json::to_vec_pretty(value).map_err(|e| QueryError::EncodingFailure(e.to_string()))
}

/// Serializes a contract message for the VM.
///
/// # Errors
///
/// [`QueryError::MalformedRequest`]; a message that cannot be re-serialized
/// is a bad request, not a response problem.
pub fn encode_contract_msg(msg: &serde_json::Value) -> Result<Vec<u8>, QueryError> {
    serde_json::to_vec(msg).map_err(|e| QueryError::MalformedRequest(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
