//! Inbound ports (driving side - API)
//!
//! The sealing loop is the only caller.

use crate::domain::SealPhase;
use crate::error::Result;
use crate::signals::{SealLifecycle, WakeSubscription};
use async_trait::async_trait;
use primitive_types::H256;
use serde::Serialize;
use std::sync::Arc;

/// Primary port: PBFT block sealer
#[async_trait]
pub trait BlockSealer: Send + Sync {
    /// Whether a cycle has work to do: active, and either the engine lets
    /// this node seal or it wants the in-flight candidate reset
    fn should_seal(&self) -> bool;

    /// One sealing cycle: adjust capacity, assemble, check, submit.
    ///
    /// With a candidate already in flight, only asks the engine whether to
    /// reset it. Fails with `NotActive` while sealing is stopped.
    async fn run_sealing_cycle(&mut self) -> Result<SealOutcome>;

    /// Start the consensus engine, then allow sealing
    async fn start(&self) -> Result<()>;

    /// Stop sealing, then stop the consensus engine
    async fn stop(&self) -> Result<()>;

    /// React to the committed chain advancing to `number`
    fn on_block_committed(&mut self, number: u64);

    /// Point-in-time status
    fn status(&self) -> SealingStatus;

    /// Shared lifecycle flag and wake signals
    fn lifecycle(&self) -> Arc<SealLifecycle>;

    /// Wake-ups for "sealing state changed, re-evaluate"
    fn subscribe_sealing_state(&self) -> WakeSubscription {
        self.lifecycle().sealing_state_changed().subscribe()
    }

    /// Wake-ups for block-level events
    fn subscribe_block_events(&self) -> WakeSubscription {
        self.lifecycle().block_event().subscribe()
    }
}

/// What a sealing cycle did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SealOutcome {
    /// Candidate handed to the engine and still in flight
    Submitted {
        /// Candidate height
        number: u64,
        /// Candidate header hash
        hash: H256,
        /// Transactions carried
        tx_count: u64,
    },
    /// Candidate exceeded the hard ceiling; dropped without submitting
    Dropped {
        /// Transactions the candidate carried
        tx_count: u64,
        /// Hard ceiling at the time
        limit: u64,
    },
    /// Engine asked for the submitted candidate to be reset
    Reset {
        /// Height of the discarded candidate
        number: u64,
    },
    /// A candidate is already in flight; nothing done
    InFlight,
    /// Nothing worth sealing (empty candidate, empty blocks disabled)
    Idle,
}

impl SealOutcome {
    /// Whether the candidate was discarded and signals fired
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Dropped { .. } | Self::Reset { .. })
    }
}

/// Sealer status snapshot
#[derive(Clone, Debug, Serialize)]
pub struct SealingStatus {
    /// Sealing running
    pub active: bool,

    /// Coordinator phase
    pub phase: SealPhase,

    /// Height of the current candidate, once its header exists
    pub candidate_number: Option<u64>,

    /// Transactions in the current candidate
    pub candidate_tx_count: u64,

    /// Current soft transaction ceiling
    pub pack_limit: u64,

    /// View at which the ceiling was last halved
    pub last_observed_view: u64,
}
