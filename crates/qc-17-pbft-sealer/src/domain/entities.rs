//! Domain entities for block sealing

use crate::utils::hashing::{merkle_root, serialize_block_header, sha256, transaction_hash};
use primitive_types::H256;
use serde::{Deserialize, Serialize};

/// A pending transaction as handed over by the pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Raw signed transaction bytes
    pub payload: Vec<u8>,

    /// Hash of `payload`
    pub hash: H256,
}

impl Transaction {
    /// Wrap raw bytes, computing the hash
    pub fn new(payload: Vec<u8>) -> Self {
        let hash = transaction_hash(&payload);
        Self { payload, hash }
    }
}

/// Block header of a committed block or a sealed candidate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number (height)
    pub number: u64,

    /// Hash of the parent header
    pub parent_hash: H256,

    /// Unix timestamp in milliseconds
    pub timestamp: u64,

    /// Committee index of the node that sealed this block
    pub sealer: u64,

    /// Merkle commitment over the block's transaction hashes
    pub transactions_root: H256,
}

impl BlockHeader {
    /// Genesis header (number 0, zero parent)
    pub fn genesis(timestamp: u64) -> Self {
        Self {
            number: 0,
            parent_hash: H256::zero(),
            timestamp,
            sealer: 0,
            transactions_root: H256::zero(),
        }
    }

    /// Header hash over all fields
    pub fn hash(&self) -> H256 {
        H256::from(sha256(&serialize_block_header(
            &self.parent_hash,
            self.number,
            self.timestamp,
            self.sealer,
            &self.transactions_root,
        )))
    }
}

/// A fully populated candidate block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Header derived from the parent
    pub header: BlockHeader,

    /// Transactions in packing order
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Number of transactions carried
    pub fn transaction_count(&self) -> u64 {
        self.transactions.len() as u64
    }

    /// Header hash
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// Recompute the transaction root from the carried transactions
    pub fn compute_transactions_root(transactions: &[Transaction]) -> H256 {
        let leaves: Vec<H256> = transactions.iter().map(|tx| tx.hash).collect();
        merkle_root(&leaves)
    }
}

/// Consensus state pulled from the engine for one decision.
///
/// Captured fresh for every eligibility check and capacity evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConsensusSnapshot {
    /// Current view number
    pub view: u64,

    /// Whether the current view has passed its deadline
    pub is_timed_out: bool,

    /// This node's index in the committee
    pub node_index: u64,
}
