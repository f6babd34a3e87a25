//! Sealing loop driver
//!
//! Owns the sealer on a dedicated tokio task:
//!
//! ```text
//! loop while active:
//!     apply committed-block notifications
//!     if should_seal(): run_sealing_cycle()
//!     wait for sealing_state_changed | block_event | commit | idle timeout
//! ```
//!
//! Chain-advance notifications from block import go through the handle's
//! channel, so the candidate is only ever touched by the loop task.

use crate::error::{Result, SealingError};
use crate::ports::BlockSealer;
use crate::signals::SealLifecycle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Spawns the sealing loop
pub struct SealingWorker;

impl SealingWorker {
    /// Start the sealer (engine first) and spawn the loop.
    pub async fn start<S>(sealer: S, idle_wait: Duration) -> Result<WorkerHandle<S>>
    where
        S: BlockSealer + 'static,
    {
        sealer.start().await?;
        let lifecycle = sealer.lifecycle();
        let (commits_tx, commits_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_loop(sealer, commits_rx, idle_wait));
        info!("[qc-17] Sealing worker started");

        Ok(WorkerHandle {
            lifecycle,
            commits: commits_tx,
            task,
        })
    }
}

/// Control handle for a running sealing loop
pub struct WorkerHandle<S> {
    lifecycle: Arc<SealLifecycle>,
    commits: mpsc::UnboundedSender<u64>,
    task: JoinHandle<S>,
}

impl<S> WorkerHandle<S>
where
    S: BlockSealer + 'static,
{
    /// Report that the committed chain advanced to `number`
    pub fn notify_block_committed(&self, number: u64) {
        if self.commits.send(number).is_err() {
            debug!(number, "[qc-17] Sealing loop gone, commit notification dropped");
        }
    }

    /// Shared lifecycle (active flag and wake signals)
    pub fn lifecycle(&self) -> Arc<SealLifecycle> {
        Arc::clone(&self.lifecycle)
    }

    /// Stop the loop, wait for the in-progress cycle to finish, then stop
    /// the engine. Returns the sealer.
    pub async fn shutdown(self) -> Result<S> {
        info!("[qc-17] Shutting down sealing worker");
        self.lifecycle.deactivate();

        let sealer = self
            .task
            .await
            .map_err(|e| SealingError::Worker(e.to_string()))?;
        sealer.stop().await?;
        Ok(sealer)
    }
}

async fn run_loop<S>(
    mut sealer: S,
    mut commits: mpsc::UnboundedReceiver<u64>,
    idle_wait: Duration,
) -> S
where
    S: BlockSealer,
{
    let lifecycle = sealer.lifecycle();
    let mut sealing_events = sealer.subscribe_sealing_state();
    let mut block_events = sealer.subscribe_block_events();

    while lifecycle.is_active() {
        while let Ok(number) = commits.try_recv() {
            sealer.on_block_committed(number);
        }

        if sealer.should_seal() {
            match sealer.run_sealing_cycle().await {
                Ok(outcome) if outcome.is_reset() => {
                    debug!(?outcome, "[qc-17] Candidate discarded, waiting to reseal")
                }
                Ok(outcome) => debug!(?outcome, "[qc-17] Sealing cycle finished"),
                Err(e) => warn!("[qc-17] Sealing cycle failed, retrying next cycle: {}", e),
            }
        }

        if !lifecycle.is_active() {
            break;
        }

        tokio::select! {
            _ = sealing_events.wait() => {}
            _ = block_events.wait() => {}
            Some(number) = commits.recv() => sealer.on_block_committed(number),
            _ = tokio::time::sleep(idle_wait) => {}
        }
    }

    info!("[qc-17] Sealing loop exited");
    sealer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SealerConfig;
    use crate::domain::SealPhase;
    use crate::service::{SealCoordinator, SealerDependencies};
    use crate::test_utils::{FixedTime, MockChain, MockEngine, MockPool};
    use std::sync::atomic::Ordering;

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..400 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    fn coordinator(
        engine: &Arc<MockEngine>,
        chain: &Arc<MockChain>,
        pool: &Arc<MockPool>,
    ) -> SealCoordinator<MockEngine, MockChain, MockPool> {
        let coordinator = SealCoordinator::new(SealerDependencies {
            engine: Arc::clone(engine),
            chain: Arc::clone(chain),
            transactions: Arc::clone(pool),
            config: SealerConfig::default(),
        })
        .unwrap()
        .with_time_source(Box::new(FixedTime(50_000)));
        engine.observe(coordinator.lifecycle());
        coordinator
    }

    #[tokio::test]
    async fn test_worker_seals_and_reseals_after_commit() {
        let engine = Arc::new(MockEngine::new(100));
        let chain = Arc::new(MockChain::new());
        let pool = Arc::new(MockPool::new(3));

        let handle = SealingWorker::start(
            coordinator(&engine, &chain, &pool),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        wait_until(|| engine.prepare_count() == 1).await;

        let committed = chain.advance();
        handle.notify_block_committed(committed);
        wait_until(|| engine.prepare_count() == 2).await;

        let sealer = handle.shutdown().await.unwrap();
        let prepared = engine.prepared.lock().unwrap().clone();
        assert_eq!(prepared[0].header.number, 1);
        assert_eq!(prepared[1].header.number, 2);
        assert_eq!(sealer.status().phase, SealPhase::Submitted);
    }

    #[tokio::test]
    async fn test_worker_retries_after_engine_reset() {
        let engine = Arc::new(MockEngine::new(100));
        engine.reset_after_prepare.store(true, Ordering::SeqCst);
        let chain = Arc::new(MockChain::new());
        let pool = Arc::new(MockPool::new(1));

        let handle = SealingWorker::start(
            coordinator(&engine, &chain, &pool),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        // The reset signal wakes the loop well before the idle timeout
        wait_until(|| engine.prepare_count() >= 3).await;
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_sealing_before_engine() {
        let engine = Arc::new(MockEngine::new(100));
        engine.eligible.store(false, Ordering::SeqCst);
        let chain = Arc::new(MockChain::new());
        let pool = Arc::new(MockPool::new(0));

        let handle = SealingWorker::start(
            coordinator(&engine, &chain, &pool),
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        assert!(engine.started.load(Ordering::SeqCst));
        assert!(handle.lifecycle().is_active());

        let sealer = handle.shutdown().await.unwrap();

        assert!(engine.stopped.load(Ordering::SeqCst));
        assert!(!engine.sealing_active_at_stop.load(Ordering::SeqCst));
        assert!(!sealer.status().active);
        assert_eq!(engine.prepare_count(), 0);
    }
}
