//! Hashing utilities for block sealing
//!
//! Provides the commitments a sealed candidate carries: transaction hashes,
//! the transaction root and the header hash. All hashing is SHA-256.

use primitive_types::H256;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute transaction hash
pub fn transaction_hash(tx: &[u8]) -> H256 {
    H256::from(sha256(tx))
}

/// Binary Merkle root over a list of leaf hashes.
///
/// An odd node at any level is paired with itself. The root of an empty
/// list is `H256::zero()`.
pub fn merkle_root(leaves: &[H256]) -> H256 {
    if leaves.is_empty() {
        return H256::zero();
    }

    let mut level: Vec<H256> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut hasher = Sha256::new();
                hasher.update(left.as_bytes());
                hasher.update(right.as_bytes());
                H256::from_slice(&hasher.finalize())
            })
            .collect();
    }
    level[0]
}

/// Serialize block header fields for hashing
///
/// Creates the canonical byte representation the header hash commits to.
pub fn serialize_block_header(
    parent_hash: &H256,
    number: u64,
    timestamp: u64,
    sealer: u64,
    transactions_root: &H256,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(96);

    bytes.extend_from_slice(parent_hash.as_bytes());
    bytes.extend_from_slice(&number.to_le_bytes());
    bytes.extend_from_slice(&timestamp.to_le_bytes());
    bytes.extend_from_slice(&sealer.to_le_bytes());
    bytes.extend_from_slice(transactions_root.as_bytes());

    bytes
}

/// Short hex prefix of a hash for log lines
pub fn abridged(hash: &H256) -> String {
    hex::encode(&hash.as_bytes()[..4])
}
