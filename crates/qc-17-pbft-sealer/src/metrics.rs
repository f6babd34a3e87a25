//! Metrics collection for block sealing

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the sealer
#[derive(Debug, Default)]
pub struct SealerMetrics {
    /// Sealing cycles run
    pub cycles: AtomicU64,

    /// Candidates handed to the consensus engine
    pub blocks_submitted: AtomicU64,

    /// Transactions carried by submitted candidates
    pub transactions_submitted: AtomicU64,

    /// Candidates dropped for exceeding the hard transaction ceiling
    pub candidates_dropped: AtomicU64,

    /// Candidates reset at the engine's request
    pub engine_resets: AtomicU64,

    /// Candidates reset because the chain advanced past them
    pub stale_resets: AtomicU64,

    /// Times the pack limit was halved
    pub capacity_halvings: AtomicU64,

    /// Times the pack limit was grown
    pub capacity_growths: AtomicU64,

    /// Current pack limit (gauge)
    pub pack_limit: AtomicU64,
}

impl SealerMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a sealing cycle
    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate handed to the engine
    pub fn record_submitted(&self, tx_count: u64) {
        self.blocks_submitted.fetch_add(1, Ordering::Relaxed);
        self.transactions_submitted
            .fetch_add(tx_count, Ordering::Relaxed);
    }

    /// Record an oversized candidate drop
    pub fn record_dropped(&self) {
        self.candidates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an engine-requested reset
    pub fn record_engine_reset(&self) {
        self.engine_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reset caused by chain advance
    pub fn record_stale_reset(&self) {
        self.stale_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pack limit halving
    pub fn record_halving(&self) {
        self.capacity_halvings.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pack limit growth
    pub fn record_growth(&self) {
        self.capacity_growths.fetch_add(1, Ordering::Relaxed);
    }

    /// Update the pack limit gauge
    pub fn set_pack_limit(&self, limit: u64) {
        self.pack_limit.store(limit, Ordering::Relaxed);
    }

    /// Get blocks submitted
    pub fn get_blocks_submitted(&self) -> u64 {
        self.blocks_submitted.load(Ordering::Relaxed)
    }

    /// Get candidates dropped
    pub fn get_candidates_dropped(&self) -> u64 {
        self.candidates_dropped.load(Ordering::Relaxed)
    }

    /// Get engine resets
    pub fn get_engine_resets(&self) -> u64 {
        self.engine_resets.load(Ordering::Relaxed)
    }

    /// Get average transactions per submitted block
    pub fn get_avg_transactions_per_block(&self) -> f64 {
        let blocks = self.blocks_submitted.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let txs = self.transactions_submitted.load(Ordering::Relaxed);
        txs as f64 / blocks as f64
    }
}
