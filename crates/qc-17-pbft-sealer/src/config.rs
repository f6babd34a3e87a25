//! Configuration types for block sealing

use crate::error::{Result, SealingError};
use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration for the sealer
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SealerConfig {
    /// Initial soft ceiling on transactions per candidate.
    /// `None` starts at the engine's hard maximum.
    pub initial_pack_limit: Option<u64>,

    /// How long the sealing worker waits for a wake signal before
    /// re-checking eligibility (milliseconds)
    pub idle_wait_ms: u64,

    /// Submit candidates that carry no transactions
    pub seal_empty_blocks: bool,
}

impl Default for SealerConfig {
    fn default() -> Self {
        Self {
            initial_pack_limit: None,
            idle_wait_ms: crate::DEFAULT_IDLE_WAIT_MS,
            seal_empty_blocks: true,
        }
    }
}

impl SealerConfig {
    /// Reject configurations the sealer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.initial_pack_limit == Some(0) {
            return Err(SealingError::InvalidConfig(
                "initial_pack_limit must be at least 1".into(),
            ));
        }
        if self.idle_wait_ms == 0 {
            return Err(SealingError::InvalidConfig(
                "idle_wait_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Idle wait as a duration
    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }
}
