//! # Domain Services
//!
//! Pure derivations used by the simulated execution environment: unit
//! addresses, operator accounts and transaction hashes.
//!
//! - NO I/O operations
//! - NO async code
//! - Pure functions only

use sha3::{Digest, Keccak256};
use shared_types::{Address, TxHash};

// =============================================================================
// HASHING
// =============================================================================

/// Computes keccak256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn last_20(hash: &[u8; 32]) -> Address {
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

// =============================================================================
// UNIT ADDRESS COMPUTATION
// =============================================================================

/// Computes the address of a unit constructed by `sender` at `nonce`.
///
/// Address = keccak256(rlp(\[sender, nonce\]))\[12:\]
#[must_use]
pub fn compute_unit_address(sender: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // RLP encode address (20 bytes, 0x80 + 20 = 0x94)
    content.push(0x94);
    content.extend_from_slice(sender.as_bytes());

    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let nonce_bytes = trimmed_be_bytes(nonce);
        content.push(0x80 + nonce_bytes.len() as u8);
        content.extend_from_slice(&nonce_bytes);
    }

    // Content never exceeds 30 bytes, so the short list header always applies
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    last_20(&keccak256(&rlp_data))
}

/// Big-endian bytes without leading zeros.
fn trimmed_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

// =============================================================================
// ACCOUNTS AND TRANSACTIONS
// =============================================================================

/// Deterministic account `index` of the simulated environment.
#[must_use]
pub fn derive_account(index: usize) -> Address {
    last_20(&keccak256(format!("mp-account-{index}").as_bytes()))
}

/// Hash identifying a confirmed submission.
#[must_use]
pub fn compute_tx_hash(sender: Address, nonce: u64, sequence: u64) -> TxHash {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(sender.as_bytes());
    data.extend_from_slice(&nonce.to_be_bytes());
    data.extend_from_slice(&sequence.to_be_bytes());
    TxHash::new(keccak256(&data))
}

// =============================================================================
// TESTS
// =============================================================================
