//! PBFT Seal Coordinator
//!
//! Decides whether this node should propose, assembles a candidate within
//! the adaptive pack limit, and hands it to the consensus engine.
//!
//! # Ownership
//! The candidate and the capacity controller are plain fields mutated
//! through `&mut self`, so only the task that owns the coordinator (the
//! sealing worker) can change them. Everything other tasks need (the active
//! flag and the wake signals) lives in the shared [`SealLifecycle`].

use crate::{
    config::SealerConfig,
    domain::{CapacityAdjustment, CapacityController, SealingState},
    error::{Result, SealingError},
    metrics::SealerMetrics,
    ports::{
        BlockSealer, ChainStore, ConsensusEngine, SealOutcome, SealingStatus, SystemTimeSource,
        TimeSource, TransactionSource,
    },
    signals::{SealLifecycle, WakeReason},
    utils::abridged,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Dependencies for SealCoordinator
pub struct SealerDependencies<E, C, T> {
    /// PBFT engine
    pub engine: Arc<E>,
    /// Committed chain reader
    pub chain: Arc<C>,
    /// Pending transaction pool
    pub transactions: Arc<T>,
    /// Sealer configuration
    pub config: SealerConfig,
}

/// Coordinates candidate assembly with the PBFT engine
pub struct SealCoordinator<E, C, T>
where
    E: ConsensusEngine,
    C: ChainStore,
    T: TransactionSource,
{
    engine: Arc<E>,
    chain: Arc<C>,
    transactions: Arc<T>,
    config: SealerConfig,
    sealing: SealingState,
    capacity: CapacityController,
    lifecycle: Arc<SealLifecycle>,
    metrics: Arc<SealerMetrics>,
    time_source: Box<dyn TimeSource>,
}

impl<E, C, T> SealCoordinator<E, C, T>
where
    E: ConsensusEngine,
    C: ChainStore,
    T: TransactionSource,
{
    /// Create a coordinator. Sealing stays inactive until [`BlockSealer::start`].
    pub fn new(deps: SealerDependencies<E, C, T>) -> Result<Self> {
        deps.config.validate()?;

        let hard_max = deps.engine.max_block_transactions();
        let initial = deps.config.initial_pack_limit.unwrap_or(hard_max);
        let capacity = CapacityController::new(initial, hard_max);

        info!("[qc-17] Initializing PBFT seal coordinator");
        info!("  Hard transaction limit: {}", hard_max);
        info!("  Initial pack limit: {}", capacity.max_pack_tx_num());
        info!("  Seal empty blocks: {}", deps.config.seal_empty_blocks);

        let metrics = Arc::new(SealerMetrics::new());
        metrics.set_pack_limit(capacity.max_pack_tx_num());

        Ok(Self {
            engine: deps.engine,
            chain: deps.chain,
            transactions: deps.transactions,
            config: deps.config,
            sealing: SealingState::Empty,
            capacity,
            lifecycle: Arc::new(SealLifecycle::new()),
            metrics,
            time_source: Box::new(SystemTimeSource),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Shared metrics
    pub fn metrics(&self) -> Arc<SealerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current candidate
    pub fn sealing_state(&self) -> &SealingState {
        &self.sealing
    }

    /// Capacity controller state
    pub fn capacity(&self) -> &CapacityController {
        &self.capacity
    }

    /// Derive the candidate header from the committed head.
    ///
    /// Collaborator failures propagate; the candidate is left as it was.
    pub async fn build_candidate(&mut self) -> Result<()> {
        let head = self.chain.head_number().await?;
        let parent = self.chain.block_header_at(head).await?;
        if parent.number != head {
            return Err(SealingError::HeaderMismatch {
                requested: head,
                actual: parent.number,
            });
        }

        let sealer = self.engine.node_idx();
        let now = self.time_source.now_millis();
        if !self.sealing.populate(&parent, sealer, now) {
            debug!("[qc-17] Candidate already submitted, not rebuilding");
        }
        Ok(())
    }

    /// Run the capacity rules against a fresh engine snapshot
    fn adjust_capacity(&mut self, hard_max: u64) {
        let snapshot = self.engine.snapshot();
        match self.capacity.evaluate(&snapshot, hard_max) {
            CapacityAdjustment::Halved { from, to } => {
                debug!(
                    view = snapshot.view,
                    node_idx = snapshot.node_index,
                    from,
                    to,
                    "[qc-17] Decrease pack limit to half for PBFT timeout"
                );
                self.metrics.record_halving();
            }
            CapacityAdjustment::Grown { from, to } => {
                debug!(from, to, "[qc-17] Increase pack limit");
                self.metrics.record_growth();
            }
            CapacityAdjustment::Clamped { from, to } => {
                debug!(from, to, "[qc-17] Clamp pack limit to engine maximum");
            }
            CapacityAdjustment::Unchanged => {}
        }
        self.metrics.set_pack_limit(self.capacity.max_pack_tx_num());
    }

    /// Fill an empty candidate from the pool, bounded by the pack limit
    async fn load_transactions(&mut self) -> Result<()> {
        let limit = self.capacity.max_pack_tx_num();
        let mut transactions = self.transactions.pending_transactions(limit).await?;
        if transactions.len() as u64 > limit {
            debug!(
                limit,
                returned = transactions.len(),
                "[qc-17] Pool returned more than the pack limit, truncating"
            );
            transactions.truncate(limit as usize);
        }
        debug!(
            limit,
            loaded = transactions.len(),
            "[qc-17] Loaded transactions for candidate"
        );
        self.sealing.load(transactions);
        Ok(())
    }

    /// Check the hard ceiling, then build and hand the candidate to the engine
    async fn try_submit(&mut self, hard_max: u64) -> Result<SealOutcome> {
        let tx_count = self.sealing.transaction_count();

        // A candidate kept across cycles can outlive a drop in the engine maximum
        if tx_count > hard_max {
            info!(
                tx_count,
                max_transactions = hard_max,
                "[qc-17] Drop block for the transaction num is over max transaction limit"
            );
            self.reset_candidate(WakeReason::CandidateDropped);
            self.metrics.record_dropped();
            return Ok(SealOutcome::Dropped {
                tx_count,
                limit: hard_max,
            });
        }

        if tx_count == 0 && !self.config.seal_empty_blocks {
            self.sealing.reset();
            return Ok(SealOutcome::Idle);
        }

        self.build_candidate().await?;
        let Some(block) = self.sealing.block() else {
            return Ok(SealOutcome::InFlight);
        };
        let number = block.header.number;
        let hash = block.hash();

        info!(
            block_number = number,
            tx_count,
            node_idx = block.header.sealer,
            hash = %abridged(&hash),
            "[qc-17] Generating seal"
        );
        self.engine.generate_prepare(block).await?;
        self.sealing.mark_submitted();
        self.metrics.record_submitted(tx_count);

        if let reset @ SealOutcome::Reset { .. } = self.check_in_flight() {
            return Ok(reset);
        }

        Ok(SealOutcome::Submitted {
            number,
            hash,
            tx_count,
        })
    }

    /// Ask the engine whether the in-flight candidate is still wanted
    fn check_in_flight(&mut self) -> SealOutcome {
        let superseded = match &self.sealing {
            SealingState::Submitted { block } if self.engine.should_reset(block) => {
                Some(block.header.number)
            }
            _ => None,
        };
        match superseded {
            Some(number) => {
                info!(
                    block_number = number,
                    "[qc-17] Engine reset the in-flight candidate"
                );
                self.reset_candidate(WakeReason::EngineReset);
                self.metrics.record_engine_reset();
                SealOutcome::Reset { number }
            }
            None => SealOutcome::InFlight,
        }
    }

    fn reset_candidate(&mut self, reason: WakeReason) {
        self.sealing.reset();
        self.lifecycle.notify_reset(reason);
    }
}

#[async_trait]
impl<E, C, T> BlockSealer for SealCoordinator<E, C, T>
where
    E: ConsensusEngine,
    C: ChainStore,
    T: TransactionSource,
{
    fn should_seal(&self) -> bool {
        if !self.lifecycle.is_active() {
            return false;
        }
        match &self.sealing {
            // Only worth a cycle if the engine wants the candidate reset
            SealingState::Submitted { block } => self.engine.should_reset(block),
            _ => self.engine.should_seal(),
        }
    }

    #[tracing::instrument(skip_all, name = "sealing_cycle")]
    async fn run_sealing_cycle(&mut self) -> Result<SealOutcome> {
        if !self.lifecycle.is_active() {
            return Err(SealingError::NotActive);
        }
        if self.sealing.is_submitted() {
            return Ok(self.check_in_flight());
        }
        self.metrics.record_cycle();

        // One read per cycle; the engine may change it concurrently
        let hard_max = self.engine.max_block_transactions();
        self.adjust_capacity(hard_max);

        if self.sealing.is_empty() {
            self.load_transactions().await?;
        }
        self.try_submit(hard_max).await
    }

    async fn start(&self) -> Result<()> {
        info!("[qc-17] Starting block sealing");
        self.engine.start().await?;
        self.lifecycle.activate();
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("[qc-17] Stopping block sealing");
        self.lifecycle.deactivate();
        self.engine.stop().await
    }

    fn on_block_committed(&mut self, number: u64) {
        if let Some(candidate) = self.sealing.candidate_number() {
            if candidate <= number {
                info!(
                    candidate,
                    committed = number,
                    "[qc-17] Chain advanced past candidate, resetting"
                );
                self.reset_candidate(WakeReason::StaleCandidate);
                self.metrics.record_stale_reset();
            }
        }
        self.lifecycle.notify_block_committed(number);
    }

    fn status(&self) -> SealingStatus {
        SealingStatus {
            active: self.lifecycle.is_active(),
            phase: self.sealing.phase(),
            candidate_number: self.sealing.candidate_number(),
            candidate_tx_count: self.sealing.transaction_count(),
            pack_limit: self.capacity.max_pack_tx_num(),
            last_observed_view: self.capacity.last_observed_view(),
        }
    }

    fn lifecycle(&self) -> Arc<SealLifecycle> {
        Arc::clone(&self.lifecycle)
    }
}
