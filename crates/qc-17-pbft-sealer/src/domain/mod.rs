//! Domain layer - Pure logic for block sealing
//!
//! No I/O and no async here. The coordinator in [`crate::service`] feeds
//! these types with data pulled from the ports.
//!
//! - [`SealingState`]: the candidate block, as a tagged state
//! - [`CapacityController`]: view-adaptive transaction ceiling
//! - [`Block`], [`BlockHeader`], [`Transaction`]: candidate contents
//! - [`ConsensusSnapshot`]: engine state read for one decision

pub mod capacity;
mod entities;
pub mod sealing;

pub use capacity::{CapacityAdjustment, CapacityController};
pub use entities::*;
pub use sealing::{SealPhase, SealingState};
