//! Adaptive transaction packing ceiling
//!
//! Halves the pack limit once per timed-out view and grows it back by 50%
//! while view 0 is healthy, never leaving `[1, hard_max]`.
//!
//! ## Rules (evaluated once per sealing cycle)
//!
//! 0. A limit above the engine's current `hard_max` is clamped down first.
//! 1. `view > 0`, timed out, view not yet seen, limit `>= 2`: halve.
//! 2. Not timed out at view 0: forget the last view; grow by half the
//!    current limit (at least 1), then clamp to `hard_max`.
//! 3. Anything else: unchanged.

use super::entities::ConsensusSnapshot;

/// Result of one capacity evaluation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapacityAdjustment {
    /// Limit halved after a view timeout
    Halved {
        /// Limit before
        from: u64,
        /// Limit after
        to: u64,
    },
    /// Limit grown on a healthy view
    Grown {
        /// Limit before
        from: u64,
        /// Limit after
        to: u64,
    },
    /// Limit lowered because the engine's hard maximum shrank
    Clamped {
        /// Limit before
        from: u64,
        /// Limit after
        to: u64,
    },
    /// No change
    Unchanged,
}

/// Tracks consensus health and the soft transaction ceiling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityController {
    max_pack_tx_num: u64,
    last_observed_view: u64,
}

impl CapacityController {
    /// Create a controller starting at `initial`, clamped into `[1, hard_max]`
    pub fn new(initial: u64, hard_max: u64) -> Self {
        Self {
            max_pack_tx_num: initial.clamp(1, hard_max.max(1)),
            last_observed_view: 0,
        }
    }

    /// Current soft ceiling
    pub fn max_pack_tx_num(&self) -> u64 {
        self.max_pack_tx_num
    }

    /// View at which the ceiling was last halved (0 once healthy again)
    pub fn last_observed_view(&self) -> u64 {
        self.last_observed_view
    }

    /// Apply one round of the adjustment rules.
    ///
    /// A limit above a shrunk `hard_max` is clamped first; the rules still
    /// run in the same evaluation, and `Clamped` is only reported when
    /// neither of them changed anything.
    pub fn evaluate(&mut self, snapshot: &ConsensusSnapshot, hard_max: u64) -> CapacityAdjustment {
        let hard_max = hard_max.max(1);

        let mut clamped = None;
        if self.max_pack_tx_num > hard_max {
            clamped = Some(CapacityAdjustment::Clamped {
                from: self.max_pack_tx_num,
                to: hard_max,
            });
            self.max_pack_tx_num = hard_max;
        }

        let from = self.max_pack_tx_num;
        if snapshot.view > 0
            && snapshot.is_timed_out
            && snapshot.view != self.last_observed_view
            && from >= 2
        {
            self.max_pack_tx_num = from / 2;
            self.last_observed_view = snapshot.view;
            return CapacityAdjustment::Halved {
                from,
                to: self.max_pack_tx_num,
            };
        }

        if !snapshot.is_timed_out && snapshot.view == 0 {
            self.last_observed_view = 0;
            if from < hard_max {
                // Step of at least one so a limit of 1 can still reach 2
                let grown = from.saturating_add((from / 2).max(1));
                self.max_pack_tx_num = grown.min(hard_max);
                return CapacityAdjustment::Grown {
                    from,
                    to: self.max_pack_tx_num,
                };
            }
        }

        clamped.unwrap_or(CapacityAdjustment::Unchanged)
    }
}
