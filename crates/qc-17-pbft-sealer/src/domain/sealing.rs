//! Candidate block lifecycle
//!
//! The candidate is a tagged state rather than a struct of optional fields,
//! so a half-built block can never be observed: transactions are loaded into
//! `Building`, and the header plus transaction root are derived in one step
//! when moving to `Ready`.
//!
//! ```text
//!   Empty ──load──→ Building ──populate──→ Ready ──mark_submitted──→ Submitted
//!     ↑                                                                 │
//!     └──────────────────────────── reset ──────────────────────────────┘
//! ```

use super::entities::{Block, BlockHeader, Transaction};
use serde::Serialize;

/// Coordinator phase derived from the candidate state
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SealPhase {
    /// No candidate, waiting for eligibility
    Idle,
    /// Candidate being assembled
    Building,
    /// Candidate handed to the consensus engine
    Submitted,
}

/// The candidate block currently owned by the sealer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SealingState {
    /// No active candidate
    #[default]
    Empty,

    /// Transactions selected, header not yet derived
    Building {
        /// Transactions in packing order
        transactions: Vec<Transaction>,
    },

    /// Header and transaction root consistent with the transactions
    Ready {
        /// The sealed candidate
        block: Block,
    },

    /// In flight inside the agreement protocol
    Submitted {
        /// The proposed candidate
        block: Block,
    },
}

impl SealingState {
    /// Drop any candidate. Idempotent.
    pub fn reset(&mut self) {
        *self = SealingState::Empty;
    }

    /// Start a new candidate with the given transactions.
    ///
    /// Only valid from `Empty`; returns `false` and leaves the state
    /// untouched otherwise.
    pub fn load(&mut self, transactions: Vec<Transaction>) -> bool {
        if !self.is_empty() {
            return false;
        }
        *self = SealingState::Building { transactions };
        true
    }

    /// Derive the header from `parent` and recompute the transaction root.
    ///
    /// From `Empty` this yields a candidate with no transactions; from
    /// `Ready` it rebuilds the header over the same transactions. A
    /// `Submitted` candidate is never rebuilt and `false` is returned.
    pub fn populate(&mut self, parent: &BlockHeader, sealer: u64, now: u64) -> bool {
        let transactions = match std::mem::take(self) {
            SealingState::Empty => Vec::new(),
            SealingState::Building { transactions } => transactions,
            SealingState::Ready { block } => block.transactions,
            submitted @ SealingState::Submitted { .. } => {
                *self = submitted;
                return false;
            }
        };

        let header = BlockHeader {
            number: parent.number + 1,
            parent_hash: parent.hash(),
            timestamp: now.max(parent.timestamp + 1),
            sealer,
            transactions_root: Block::compute_transactions_root(&transactions),
        };
        *self = SealingState::Ready {
            block: Block {
                header,
                transactions,
            },
        };
        true
    }

    /// Move a `Ready` candidate to `Submitted`
    pub fn mark_submitted(&mut self) -> bool {
        match std::mem::take(self) {
            SealingState::Ready { block } => {
                *self = SealingState::Submitted { block };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Coordinator phase for this state
    pub fn phase(&self) -> SealPhase {
        match self {
            SealingState::Empty => SealPhase::Idle,
            SealingState::Building { .. } | SealingState::Ready { .. } => SealPhase::Building,
            SealingState::Submitted { .. } => SealPhase::Submitted,
        }
    }

    /// No active candidate
    pub fn is_empty(&self) -> bool {
        matches!(self, SealingState::Empty)
    }

    /// Candidate is in flight
    pub fn is_submitted(&self) -> bool {
        matches!(self, SealingState::Submitted { .. })
    }

    /// Number of transactions the candidate carries
    pub fn transaction_count(&self) -> u64 {
        match self {
            SealingState::Empty => 0,
            SealingState::Building { transactions } => transactions.len() as u64,
            SealingState::Ready { block } | SealingState::Submitted { block } => {
                block.transaction_count()
            }
        }
    }

    /// The populated block, if the header has been derived
    pub fn block(&self) -> Option<&Block> {
        match self {
            SealingState::Ready { block } | SealingState::Submitted { block } => Some(block),
            _ => None,
        }
    }

    /// Height the candidate targets, if known
    pub fn candidate_number(&self) -> Option<u64> {
        self.block().map(|block| block.header.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::H256;

    fn parent() -> BlockHeader {
        BlockHeader {
            number: 9,
            parent_hash: H256::repeat_byte(1),
            timestamp: 5_000,
            sealer: 2,
            transactions_root: H256::zero(),
        }
    }

    fn txs(n: u8) -> Vec<Transaction> {
        (0..n).map(|i| Transaction::new(vec![i])).collect()
    }

    #[test]
    fn test_populate_from_empty_yields_empty_candidate() {
        let mut state = SealingState::Empty;
        assert!(state.populate(&parent(), 1, 6_000));

        let block = state.block().unwrap();
        assert_eq!(block.header.number, 10);
        assert_eq!(block.header.parent_hash, parent().hash());
        assert_eq!(block.header.sealer, 1);
        assert_eq!(block.transaction_count(), 0);
        assert_eq!(block.header.transactions_root, H256::zero());
        assert_eq!(state.phase(), SealPhase::Building);
    }

    #[test]
    fn test_populate_commits_to_loaded_transactions() {
        let mut state = SealingState::Empty;
        assert!(state.load(txs(3)));
        assert_eq!(state.transaction_count(), 3);
        assert!(state.block().is_none());

        assert!(state.populate(&parent(), 0, 6_000));
        let block = state.block().unwrap();
        assert_eq!(
            block.header.transactions_root,
            Block::compute_transactions_root(&txs(3))
        );
    }

    #[test]
    fn test_timestamp_never_precedes_parent() {
        let mut state = SealingState::Empty;
        state.populate(&parent(), 0, 1_000);
        assert_eq!(state.block().unwrap().header.timestamp, 5_001);
    }

    #[test]
    fn test_load_rejected_when_candidate_exists() {
        let mut state = SealingState::Empty;
        assert!(state.load(txs(1)));
        assert!(!state.load(txs(2)));
        assert_eq!(state.transaction_count(), 1);
    }

    #[test]
    fn test_submitted_candidate_is_not_rebuilt() {
        let mut state = SealingState::Empty;
        state.load(txs(2));
        state.populate(&parent(), 0, 6_000);
        assert!(state.mark_submitted());
        let before = state.clone();

        let mut newer = parent();
        newer.number = 20;
        assert!(!state.populate(&newer, 0, 7_000));
        assert_eq!(state, before);
        assert_eq!(state.phase(), SealPhase::Submitted);
    }

    #[test]
    fn test_mark_submitted_requires_ready() {
        let mut state = SealingState::Empty;
        state.load(txs(1));
        assert!(!state.mark_submitted());
        assert_eq!(state.phase(), SealPhase::Building);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = SealingState::Empty;
        state.load(txs(4));
        state.populate(&parent(), 0, 6_000);

        state.reset();
        assert!(state.is_empty());
        state.reset();
        assert!(state.is_empty());
        assert_eq!(state.phase(), SealPhase::Idle);
        assert_eq!(state.candidate_number(), None);
    }
}
