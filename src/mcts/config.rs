//! MCTS configuration parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// UCT exploration constant (default: sqrt(2) = 1.414).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Wall-clock budget per search, in milliseconds.
    /// An iteration that has started always completes.
    pub time_budget_ms: u64,

    /// Iteration cap per search, independent of the time budget.
    pub max_iterations: u32,

    /// Maximum actions played by one rollout.
    pub rollout_depth: u32,

    /// Maximum nodes to allocate in the tree.
    /// Prevents memory exhaustion on long searches.
    pub max_nodes: usize,

    /// Weight of the grade sub-score in the blended score.
    pub grade_weight: f64,

    /// Weight of the damage sub-score in the blended score.
    pub damage_weight: f64,

    /// Vanguard grade that counts as a full grade score.
    pub expected_max_grade: u8,

    /// Own damage at which rollouts guard every attack they can stop.
    pub guard_damage_threshold: usize,

    /// Chance a rollout tries to guard an attack below the threshold.
    pub guard_probability: f64,

    /// Random seed for determinization and rollouts.
    /// Same seed produces deterministic searches.
    pub seed: u64,

    /// Reshuffle the searching player's own deck when determinizing.
    /// The searcher knows its deck contents but not their order.
    pub shuffle_own_deck: bool,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            time_budget_ms: 1_000,
            max_iterations: 10_000,
            rollout_depth: 60,
            max_nodes: 100_000,
            grade_weight: 0.4,
            damage_weight: 0.6,
            expected_max_grade: 3,
            guard_damage_threshold: 4,
            guard_probability: 2.0 / 3.0,
            seed: 42,
            shuffle_own_deck: true,
        }
    }
}

impl MCTSConfig {
    /// Time budget as a `Duration`.
    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Create a new config with custom exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }

    /// Set the grade and damage blend weights.
    #[must_use]
    pub fn with_weights(mut self, grade: f64, damage: f64) -> Self {
        self.grade_weight = grade;
        self.damage_weight = damage;
        self
    }

    #[must_use]
    pub fn with_guard_damage_threshold(mut self, damage: usize) -> Self {
        self.guard_damage_threshold = damage;
        self
    }

    /// Keep the searcher's own deck order as it is in the root state.
    #[must_use]
    pub fn without_own_shuffle(mut self) -> Self {
        self.shuffle_own_deck = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MCTSConfig::default();
        assert!((config.exploration_constant - std::f64::consts::SQRT_2).abs() < 0.001);
        assert_eq!(config.seed, 42);
        assert_eq!(config.grade_weight, 0.4);
        assert_eq!(config.damage_weight, 0.6);
        assert_eq!(config.expected_max_grade, 3);
        assert!(config.shuffle_own_deck);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MCTSConfig::default()
            .with_exploration(2.0)
            .with_seed(123)
            .with_max_iterations(50)
            .with_time_budget(Duration::from_millis(250))
            .without_own_shuffle();

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.time_budget(), Duration::from_millis(250));
        assert!(!config.shuffle_own_deck);
    }

    #[test]
    fn test_serialization() {
        let config = MCTSConfig::default().with_rollout_depth(12);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MCTSConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
