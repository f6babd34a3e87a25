//! Mock ports shared by the unit tests

use crate::domain::{Block, BlockHeader, Transaction};
use crate::error::{Result, SealingError};
use crate::ports::{ChainStore, ConsensusEngine, TimeSource, TransactionSource};
use crate::signals::SealLifecycle;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) struct MockEngine {
    pub max_block_transactions: AtomicU64,
    pub view: AtomicU64,
    pub timed_out: AtomicBool,
    pub node_idx: AtomicU64,
    pub eligible: AtomicBool,
    pub reset_after_prepare: AtomicBool,
    pub fail_prepare: AtomicBool,
    pub prepare_attempts: AtomicU64,
    pub prepared: Mutex<Vec<Block>>,
    pub started: AtomicBool,
    pub stopped: AtomicBool,
    pub sealing_active_at_start: AtomicBool,
    pub sealing_active_at_stop: AtomicBool,
    observed: Mutex<Option<Arc<SealLifecycle>>>,
}

impl MockEngine {
    pub fn new(max_block_transactions: u64) -> Self {
        Self {
            max_block_transactions: AtomicU64::new(max_block_transactions),
            view: AtomicU64::new(0),
            timed_out: AtomicBool::new(false),
            node_idx: AtomicU64::new(2),
            eligible: AtomicBool::new(true),
            reset_after_prepare: AtomicBool::new(false),
            fail_prepare: AtomicBool::new(false),
            prepare_attempts: AtomicU64::new(0),
            prepared: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            sealing_active_at_start: AtomicBool::new(false),
            sealing_active_at_stop: AtomicBool::new(false),
            observed: Mutex::new(None),
        }
    }

    /// Watch the sealer's lifecycle flag during start/stop
    pub fn observe(&self, lifecycle: Arc<SealLifecycle>) {
        *self.observed.lock().unwrap() = Some(lifecycle);
    }

    pub fn set_view(&self, view: u64, timed_out: bool) {
        self.view.store(view, Ordering::SeqCst);
        self.timed_out.store(timed_out, Ordering::SeqCst);
    }

    pub fn prepare_count(&self) -> usize {
        self.prepared.lock().unwrap().len()
    }

    fn sealing_active(&self) -> bool {
        self.observed
            .lock()
            .unwrap()
            .as_ref()
            .map(|lifecycle| lifecycle.is_active())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ConsensusEngine for MockEngine {
    fn max_block_transactions(&self) -> u64 {
        self.max_block_transactions.load(Ordering::SeqCst)
    }

    fn should_seal(&self) -> bool {
        self.eligible.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<()> {
        self.sealing_active_at_start
            .store(self.sealing_active(), Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.sealing_active_at_stop
            .store(self.sealing_active(), Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn generate_prepare(&self, block: &Block) -> Result<()> {
        self.prepare_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_prepare.load(Ordering::SeqCst) {
            return Err(SealingError::Consensus("engine unavailable".into()));
        }
        self.prepared.lock().unwrap().push(block.clone());
        Ok(())
    }

    fn should_reset(&self, _block: &Block) -> bool {
        self.reset_after_prepare.load(Ordering::SeqCst)
    }

    fn view(&self) -> u64 {
        self.view.load(Ordering::SeqCst)
    }

    fn timeout(&self) -> bool {
        self.timed_out.load(Ordering::SeqCst)
    }

    fn node_idx(&self) -> u64 {
        self.node_idx.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockChain {
    headers: Mutex<Vec<BlockHeader>>,
    pub unreachable: AtomicBool,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            headers: Mutex::new(vec![BlockHeader::genesis(1_000)]),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Commit an empty child of the current head, returning its number
    pub fn advance(&self) -> u64 {
        let mut headers = self.headers.lock().unwrap();
        let parent = headers.last().cloned().unwrap();
        let child = BlockHeader {
            number: parent.number + 1,
            parent_hash: parent.hash(),
            timestamp: parent.timestamp + 1_000,
            sealer: 0,
            transactions_root: Default::default(),
        };
        headers.push(child);
        parent.number + 1
    }

    pub fn head(&self) -> BlockHeader {
        self.headers.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChainStore for MockChain {
    async fn head_number(&self) -> Result<u64> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(SealingError::ChainStore("storage unreachable".into()));
        }
        Ok(self.head().number)
    }

    async fn block_header_at(&self, number: u64) -> Result<BlockHeader> {
        self.headers
            .lock()
            .unwrap()
            .get(number as usize)
            .cloned()
            .ok_or_else(|| SealingError::ChainStore(format!("no header at {number}")))
    }
}

/// Pool holding `available` transactions; `overfill` ignores the limit
pub(crate) struct MockPool {
    pub available: AtomicU64,
    pub overfill: AtomicBool,
    pub requested: Mutex<Vec<u64>>,
}

impl MockPool {
    pub fn new(available: u64) -> Self {
        Self {
            available: AtomicU64::new(available),
            overfill: AtomicBool::new(false),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<u64> {
        self.requested.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl TransactionSource for MockPool {
    async fn pending_transactions(&self, limit: u64) -> Result<Vec<Transaction>> {
        self.requested.lock().unwrap().push(limit);
        let available = self.available.load(Ordering::SeqCst);
        let count = if self.overfill.load(Ordering::SeqCst) {
            available
        } else {
            available.min(limit)
        };
        Ok((0..count)
            .map(|i| Transaction::new(i.to_le_bytes().to_vec()))
            .collect())
    }
}

pub(crate) struct FixedTime(pub u64);

impl TimeSource for FixedTime {
    fn now_millis(&self) -> u64 {
        self.0
    }
}
