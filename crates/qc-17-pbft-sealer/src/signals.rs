//! Lifecycle flag and wake-up signaling
//!
//! Two independent broadcast channels:
//!
//! - `sealing_state_changed`: the candidate was dropped or reset, or sealing
//!   stopped. The sealing loop re-checks eligibility.
//! - `block_event`: something happened at block level downstream (a reset
//!   candidate, or the committed chain advanced).
//!
//! Every reset fires both. A wake carries a [`WakeReason`] for logging only;
//! receivers must re-check the actual state after waking.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered wake-ups per subscriber before it starts lagging
const SIGNAL_CAPACITY: usize = 64;

/// Why a signal fired
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WakeReason {
    /// Candidate exceeded the hard transaction ceiling and was dropped
    CandidateDropped,
    /// Consensus engine asked for the candidate to be reset
    EngineReset,
    /// Chain advanced past the candidate's height
    StaleCandidate,
    /// A block at this height was committed
    BlockCommitted(u64),
    /// Sealing was stopped
    Shutdown,
}

/// A broadcast wake-up channel
#[derive(Debug)]
pub struct WakeSignal {
    name: &'static str,
    sender: broadcast::Sender<WakeReason>,
}

impl WakeSignal {
    /// Create a named signal
    pub fn new(name: &'static str) -> Self {
        let (sender, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { name, sender }
    }

    /// Wake every current subscriber. Returns how many were reached.
    pub fn notify_all(&self, reason: WakeReason) -> usize {
        // Err only means nobody is listening
        let reached = self.sender.send(reason).unwrap_or(0);
        debug!(signal = self.name, ?reason, reached, "[qc-17] Signal fired");
        reached
    }

    /// Subscribe to future wake-ups
    pub fn subscribe(&self) -> WakeSubscription {
        WakeSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving side of a [`WakeSignal`]
#[derive(Debug)]
pub struct WakeSubscription {
    receiver: broadcast::Receiver<WakeReason>,
}

impl WakeSubscription {
    /// Wait for the next wake-up.
    ///
    /// Returns `None` once the signal is dropped.
    pub async fn wait(&mut self) -> Option<WakeReason> {
        loop {
            match self.receiver.recv().await {
                Ok(reason) => return Some(reason),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "[qc-17] Wake subscriber lagged");
                    continue;
                }
            }
        }
    }

    /// Take a pending wake-up without blocking
    pub fn try_wait(&mut self) -> Option<WakeReason> {
        loop {
            match self.receiver.try_recv() {
                Ok(reason) => return Some(reason),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Active flag plus the two wake channels, shared between the sealing
/// loop and whoever controls it
#[derive(Debug)]
pub struct SealLifecycle {
    active: AtomicBool,
    sealing_state_changed: WakeSignal,
    block_event: WakeSignal,
}

impl Default for SealLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl SealLifecycle {
    /// Inactive lifecycle with fresh signals
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            sealing_state_changed: WakeSignal::new("sealing_state_changed"),
            block_event: WakeSignal::new("block_event"),
        }
    }

    /// Whether sealing is running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Allow sealing cycles
    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Stop sealing cycles and wake the loop so it notices
    pub fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.sealing_state_changed.notify_all(WakeReason::Shutdown);
        }
    }

    /// Signal fired when the candidate changes under the loop
    pub fn sealing_state_changed(&self) -> &WakeSignal {
        &self.sealing_state_changed
    }

    /// Signal fired on block-level events
    pub fn block_event(&self) -> &WakeSignal {
        &self.block_event
    }

    /// Fire both signals after a candidate reset
    pub fn notify_reset(&self, reason: WakeReason) {
        self.sealing_state_changed.notify_all(reason);
        self.block_event.notify_all(reason);
    }

    /// Fire the block signal after the chain advanced
    pub fn notify_block_committed(&self, number: u64) {
        self.block_event.notify_all(WakeReason::BlockCommitted(number));
    }
}
