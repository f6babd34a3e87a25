//! Outbound ports (driven side - SPI)
//!
//! The agreement protocol, block storage and the transaction pool live in
//! other subsystems. The sealer only sees them through these traits.

use crate::domain::{Block, BlockHeader, ConsensusSnapshot, Transaction};
use crate::error::Result;
use async_trait::async_trait;

/// Port: PBFT consensus engine
///
/// Accessors must be safe to call while the engine's own tasks mutate view
/// and timeout state. Two reads are not assumed to be mutually consistent.
#[async_trait]
pub trait ConsensusEngine: Send + Sync {
    /// Hard per-block transaction ceiling enforced by the protocol
    fn max_block_transactions(&self) -> u64;

    /// Whether this node may propose in the current view
    fn should_seal(&self) -> bool;

    /// Start the agreement protocol
    async fn start(&self) -> Result<()>;

    /// Stop the agreement protocol
    async fn stop(&self) -> Result<()>;

    /// Hand a candidate to the protocol (pre-prepare)
    async fn generate_prepare(&self, block: &Block) -> Result<()>;

    /// Whether a just-submitted candidate is no longer viable
    fn should_reset(&self, block: &Block) -> bool;

    /// Current view
    fn view(&self) -> u64;

    /// Whether the current view has timed out
    fn timeout(&self) -> bool;

    /// This node's committee index
    fn node_idx(&self) -> u64;

    /// Read view, timeout and node index for one decision
    fn snapshot(&self) -> ConsensusSnapshot {
        ConsensusSnapshot {
            view: self.view(),
            is_timed_out: self.timeout(),
            node_index: self.node_idx(),
        }
    }
}

/// Port: Read the committed chain from Block Storage
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Height of the committed head
    async fn head_number(&self) -> Result<u64>;

    /// Header of the committed block at `number`
    async fn block_header_at(&self, number: u64) -> Result<BlockHeader>;
}

/// Port: Fetch pending transactions from the Mempool
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Up to `limit` pending transactions in packing order
    async fn pending_transactions(&self, limit: u64) -> Result<Vec<Transaction>>;
}

/// Time source for header timestamps
pub trait TimeSource: Send + Sync {
    /// Current unix time in milliseconds
    fn now_millis(&self) -> u64;
}

/// Default time source using the system clock
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
    }
}
