//! Counters gathered by one `MCTSSearch::search` call.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Statistics collected during one call to `search`.
///
/// Reset at the start of every search, so after `advance` the numbers
/// describe only the new search; `reused_nodes` records what the previous
/// one left behind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub iterations: u32,
    pub nodes_expanded: u32,
    pub simulations: u32,

    /// Actions played across all rollouts.
    pub rollout_actions: u64,

    /// Tree actions the engine rejected on a determinized state.
    pub failed_applies: u32,

    /// Deepest node a rollout started from.
    pub max_depth: u16,

    /// Nodes kept from the previous search.
    pub reused_nodes: usize,

    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_expansion(&mut self) {
        self.nodes_expanded += 1;
    }

    pub(crate) fn record_failed_apply(&mut self) {
        self.failed_applies += 1;
    }

    /// One rollout of `played` actions started from a node at `depth`.
    pub(crate) fn record_rollout(&mut self, depth: u16, played: u32) {
        self.simulations += 1;
        self.rollout_actions += u64::from(played);
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn finish(&mut self, elapsed: Duration) {
        self.time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        per_second(u64::from(self.iterations), self.time_us)
    }

    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        per_second(u64::from(self.simulations), self.time_us)
    }

    /// Average rollout length in actions.
    #[must_use]
    pub fn avg_rollout_length(&self) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        self.rollout_actions as f64 / f64::from(self.simulations)
    }

    /// Share of attempted tree applies the engine rejected.
    ///
    /// High values mean the determinized worlds often disagree with the
    /// tree, usually because costs recorded under one deal are
    /// unaffordable under another.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.nodes_expanded + self.failed_applies;
        if attempts == 0 {
            return 0.0;
        }
        f64::from(self.failed_applies) / f64::from(attempts)
    }
}

fn per_second(count: u64, time_us: u64) -> f64 {
    if time_us == 0 {
        0.0
    } else {
        count as f64 / (time_us as f64 / 1_000_000.0)
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} expanded, {} reused, depth {}, {:.1} actions/rollout, {:.0} it/s",
            self.iterations,
            self.nodes_expanded,
            self.reused_nodes,
            self.max_depth,
            self.avg_rollout_length(),
            self.iterations_per_second(),
        )
    }
}
