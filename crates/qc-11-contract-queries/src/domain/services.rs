//! # Domain Services
//!
//! Pure, deterministic helpers for code and contract identity.

use crate::domain::value_objects::{Address, CodeId, Hash};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// Computes the address of the `instance_id`-th contract instantiated from
/// `code_id`.
///
/// Address = keccak256(code_id_be ‖ instance_id_be)\[12:\]
#[must_use]
pub fn compute_contract_address(code_id: CodeId, instance_id: u64) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(code_id.0.to_be_bytes());
    hasher.update(instance_id.to_be_bytes());
    let hash = hasher.finalize();

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address(addr)
}

/// SHA-256 checksum identifying a bytecode blob.
#[must_use]
pub fn code_checksum(code: &[u8]) -> Hash {
    let digest = Sha256::digest(code);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Hash(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
