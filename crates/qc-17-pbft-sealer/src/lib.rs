//! # Quantum Chain - PBFT Block Sealer (Subsystem 17)
//!
//! **Bounded Context:** Block Sealing for PBFT consensus
//! **Architecture Compliance:** DDD + Hexagonal + TDD
//!
//! ## Purpose
//!
//! Decides, cycle by cycle, whether this node should propose the next block,
//! assembles a candidate within a transaction budget that adapts to consensus
//! health, and hands it to the PBFT engine:
//! - Seal eligibility: own readiness AND the engine's leader check
//! - Adaptive pack limit: halved once per timed-out view, grown by 50% while
//!   view 0 is healthy, always within `[1, hard_max]`
//! - Hard ceiling guard: oversized candidates are dropped, never proposed
//! - Engine feedback: a rejected or superseded candidate is reset and the
//!   sealing loop is woken to retry
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Worker (Outer)                                     │
//! │  - SealingWorker: loop task owning the coordinator  │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: BlockSealer                             │
//! │  - Outbound: ConsensusEngine, ChainStore,           │
//! │              TransactionSource                      │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - SealingState (Empty | Building | Ready |         │
//! │                  Submitted)                         │
//! │  - CapacityController                               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! `start()` starts the engine before any cycle can submit to it; `stop()`
//! stops sealing first so no submission races a stopping engine.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let coordinator = SealCoordinator::new(SealerDependencies {
//!     engine,
//!     chain,
//!     transactions,
//!     config: SealerConfig::default(),
//! })?;
//! let handle = SealingWorker::start(coordinator, config.idle_wait()).await?;
//!
//! // From block import
//! handle.notify_block_committed(number);
//!
//! let coordinator = handle.shutdown().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Domain models and sealing logic
pub mod domain;
pub mod ports;
pub mod service;
pub mod signals;
pub mod utils;
pub mod worker;

mod config;
mod error;
mod metrics;

#[cfg(test)]
mod test_utils;

pub use config::SealerConfig;
pub use error::{Result, SealingError};
pub use metrics::SealerMetrics;

pub use domain::{
    Block, BlockHeader, CapacityAdjustment, CapacityController, ConsensusSnapshot, SealPhase,
    SealingState, Transaction,
};

pub use ports::{
    BlockSealer, ChainStore, ConsensusEngine, SealOutcome, SealingStatus, SystemTimeSource,
    TimeSource, TransactionSource,
};

pub use service::{SealCoordinator, SealerDependencies};
pub use signals::{SealLifecycle, WakeReason, WakeSignal, WakeSubscription};
pub use worker::{SealingWorker, WorkerHandle};

/// Subsystem number within the node (the `[qc-17]` log prefix)
pub const SUBSYSTEM_ID: u8 = 17;

/// Default sealing loop poll interval (milliseconds)
pub const DEFAULT_IDLE_WAIT_MS: u64 = 100;
