//! Error types for the block sealing subsystem
//!
//! Oversized candidates and engine-requested resets are steady-state flow
//! control and are reported through [`crate::SealOutcome`], never as errors.

use thiserror::Error;

/// Result type alias for sealing operations
pub type Result<T> = std::result::Result<T, SealingError>;

/// Errors that can occur during a sealing cycle
#[derive(Debug, Error)]
pub enum SealingError {
    /// Chain store could not serve the head or a header
    #[error("Chain store error: {0}")]
    ChainStore(String),

    /// Consensus engine failed to start, stop or accept a proposal
    #[error("Consensus error: {0}")]
    Consensus(String),

    /// Transaction pool could not provide pending transactions
    #[error("Transaction source error: {0}")]
    TransactionSource(String),

    /// Chain store returned a header for a different height than requested
    #[error("Header mismatch: requested {requested}, got {actual}")]
    HeaderMismatch {
        /// Requested block number
        requested: u64,
        /// Number on the returned header
        actual: u64,
    },

    /// Sealing is not active (coordinator stopped)
    #[error("Sealing not active")]
    NotActive,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sealing worker task failed
    #[error("Worker error: {0}")]
    Worker(String),
}

impl SealingError {
    /// Check if error is recoverable (retry on the next cycle)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ChainStore(_)
                | Self::Consensus(_)
                | Self::TransactionSource(_)
                | Self::HeaderMismatch { .. }
        )
    }

    /// Check if error is critical (should stop sealing)
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Worker(_))
    }
}
