//! MCTS node structures.
//!
//! Uses arena-based allocation with index references (NodeId) for efficiency
//! and serializability. A node records the action that led to it and the
//! sums of both rollout sub-scores, always from the searching player's
//! point of view.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::MCTSConfig;
use crate::core::Action;

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// The two normalized sub-scores of an evaluated state, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Searcher's vanguard grade against the expected maximum.
    pub grade: f64,
    /// Opponent's damage against the loss threshold.
    pub damage: f64,
}

impl Scores {
    /// Weighted blend of both sub-scores.
    #[must_use]
    pub fn blend(&self, config: &MCTSConfig) -> f64 {
        config.grade_weight * self.grade + config.damage_weight * self.damage
    }
}

/// A node in the MCTS tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Action applied at the parent to reach this node (None for root).
    pub action: Option<Action>,

    /// Depth in tree (root = 0).
    pub depth: u16,

    /// Total visits to this node.
    pub visits: u32,

    /// Sum of grade sub-scores backed up through this node.
    pub grade_total: f64,

    /// Sum of damage sub-scores backed up through this node.
    pub damage_total: f64,

    /// Children in expansion order.
    /// SmallVec optimizes for typical branching factor < 8.
    pub children: SmallVec<[NodeId; 8]>,
}

impl MCTSNode {
    /// Create a new node.
    #[must_use]
    pub fn new(parent: NodeId, action: Option<Action>, depth: u16) -> Self {
        Self {
            parent,
            action,
            depth,
            visits: 0,
            grade_total: 0.0,
            damage_total: 0.0,
            children: SmallVec::new(),
        }
    }

    /// Create a root node.
    #[must_use]
    pub fn root() -> Self {
        Self::new(NodeId::NONE, None, 0)
    }

    /// Record one backed-up evaluation.
    pub fn record(&mut self, scores: Scores) {
        self.visits += 1;
        self.grade_total += scores.grade;
        self.damage_total += scores.damage;
    }

    /// Mean sub-scores (zero when unvisited).
    #[must_use]
    pub fn mean_scores(&self) -> Scores {
        if self.visits == 0 {
            return Scores::default();
        }
        let n = f64::from(self.visits);
        Scores {
            grade: self.grade_total / n,
            damage: self.damage_total / n,
        }
    }

    /// Mean blended score, the "win rate" term of UCT.
    #[must_use]
    pub fn mean_score(&self, config: &MCTSConfig) -> f64 {
        self.mean_scores().blend(config)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(5);
        assert_eq!(id.raw(), 5);
        assert!(!id.is_none());
        assert_eq!(format!("{}", id), "NodeId(5)");

        assert!(NodeId::NONE.is_none());
        assert_eq!(format!("{}", NodeId::NONE), "NodeId(NONE)");
    }

    #[test]
    fn test_node_root() {
        let node = MCTSNode::root();

        assert!(node.parent.is_none());
        assert!(node.action.is_none());
        assert_eq!(node.depth, 0);
        assert_eq!(node.visits, 0);
        assert!(node.is_leaf());
    }

    #[test]
    fn test_record_and_means() {
        let mut node = MCTSNode::new(NodeId::new(0), Some(Action::PassMainPhase), 1);
        assert_eq!(node.mean_scores(), Scores::default());

        node.record(Scores { grade: 1.0, damage: 0.5 });
        node.record(Scores { grade: 0.0, damage: 0.5 });

        assert_eq!(node.visits, 2);
        assert_eq!(node.mean_scores(), Scores { grade: 0.5, damage: 0.5 });

        let config = MCTSConfig::default();
        assert!((node.mean_score(&config) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_blend_weights() {
        let config = MCTSConfig::default();
        let scores = Scores { grade: 1.0, damage: 0.0 };
        assert!((scores.blend(&config) - 0.4).abs() < 1e-9);

        let scores = Scores { grade: 0.0, damage: 1.0 };
        assert!((scores.blend(&config) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_serialization() {
        let mut node = MCTSNode::new(NodeId::new(3), Some(Action::PassBattlePhase), 2);
        node.visits = 100;
        node.children.push(NodeId::new(7));

        let json = serde_json::to_string(&node).unwrap();
        let deserialized: MCTSNode = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.action, Some(Action::PassBattlePhase));
        assert_eq!(deserialized.visits, 100);
        assert_eq!(deserialized.children.len(), 1);
    }
}
