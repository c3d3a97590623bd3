//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references for efficiency,
//! cache-friendliness, and serializability. Moving the root to a subtree
//! rebuilds the arena with only that subtree, so no node ever outlives
//! its reachability from the root.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::node::{MCTSNode, NodeId, Scores};
use crate::core::{Action, PlayerId};

/// Arena-based MCTS tree.
///
/// Nodes are stored in a flat vector and referenced by `NodeId` indices.
/// This avoids reference counting overhead and enables serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    /// All nodes in the tree.
    nodes: Vec<MCTSNode>,

    /// The root node ID (always 0).
    root: NodeId,

    /// Player whose point of view every score takes.
    searcher: PlayerId,

    /// Fingerprint of the position the root stands for, if known.
    #[serde(default)]
    root_key: Option<u64>,
}

impl MCTSTree {
    /// Create a new tree with a root node.
    #[must_use]
    pub fn new(searcher: PlayerId) -> Self {
        Self::with_capacity(searcher, 1024)
    }

    /// Create a tree with custom initial capacity.
    #[must_use]
    pub fn with_capacity(searcher: PlayerId, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(MCTSNode::root());
        Self {
            nodes,
            root: NodeId::new(0),
            searcher,
            root_key: None,
        }
    }

    /// Tag the root with the position it was built for.
    #[must_use]
    pub fn with_root_key(mut self, key: Option<u64>) -> Self {
        self.root_key = key;
        self
    }

    /// Whether this tree was built for the position `key` identifies.
    ///
    /// An untagged tree matches nothing.
    #[must_use]
    pub fn is_rooted_at(&self, key: Option<u64>) -> bool {
        self.root_key.is_some() && self.root_key == key
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn searcher(&self) -> PlayerId {
        self.searcher
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a child of `parent` reached by `action`.
    pub fn add_child(&mut self, parent: NodeId, action: Action) -> NodeId {
        let depth = self.get(parent).depth + 1;
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(MCTSNode::new(parent, Some(action), depth));
        self.get_mut(parent).children.push(id);
        id
    }

    /// The child of `parent` reached by `action`, compared structurally.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, action: &Action) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).action.as_ref() == Some(action))
    }

    /// Add `scores` to `leaf` and every ancestor up to the root.
    pub fn backpropagate(&mut self, leaf: NodeId, scores: Scores) {
        let mut current = leaf;
        while !current.is_none() {
            let node = self.get_mut(current);
            node.record(scores);
            current = node.parent;
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root)
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// A new tree holding only the subtree under `new_root`.
    ///
    /// Nodes are renumbered breadth first; the new root has no parent and
    /// depth 0. Visit counts and score sums are kept. The result is
    /// untagged: tag it with the position the subtree now stands for.
    #[must_use]
    pub fn compact(&self, new_root: NodeId) -> Self {
        let mut nodes: Vec<MCTSNode> = Vec::new();
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);
        let base_depth = self.get(new_root).depth;

        while let Some((old, parent)) = queue.pop_front() {
            let id = NodeId::new(nodes.len() as u32);
            let source = self.get(old);
            let mut node = MCTSNode::new(parent, source.action.clone(), source.depth - base_depth);
            node.visits = source.visits;
            node.grade_total = source.grade_total;
            node.damage_total = source.damage_total;
            nodes.push(node);

            if !parent.is_none() {
                nodes[parent.0 as usize].children.push(id);
            }
            for &child in &source.children {
                queue.push_back((child, id));
            }
        }

        if let Some(root) = nodes.first_mut() {
            root.action = None;
        }
        Self {
            nodes,
            root: NodeId::new(0),
            searcher: self.searcher,
            root_key: None,
        }
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();
        let total_children: usize = self.nodes.iter().map(|n| n.children.len()).sum();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            leaf_count,
            total_children,
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Maximum depth reached.
    pub max_depth: u16,

    /// Nodes without children.
    pub leaf_count: usize,

    /// Total parent-child links.
    pub total_children: usize,
}

impl TreeStats {
    /// Average children per inner node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        let inner = self.node_count - self.leaf_count;
        if inner == 0 {
            0.0
        } else {
            self.total_children as f64 / inner as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::CircleName;

    fn attack(target: CircleName) -> Action {
        Action::Attack { attacker: CircleName::V, target, boost: false }
    }

    #[test]
    fn test_tree_new() {
        let tree = MCTSTree::new(PlayerId::new(0));

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert_eq!(tree.searcher(), PlayerId::new(0));
    }

    #[test]
    fn test_add_and_find_child() {
        let mut tree = MCTSTree::new(PlayerId::new(0));
        let root = tree.root();

        let a = tree.add_child(root, attack(CircleName::V));
        let b = tree.add_child(root, attack(CircleName::R1));

        assert_eq!(a, NodeId::new(1));
        assert_eq!(tree.get(b).depth, 1);
        assert_eq!(tree.find_child(root, &attack(CircleName::R1)), Some(b));
        assert_eq!(tree.find_child(root, &attack(CircleName::R2)), None);
    }

    #[test]
    fn test_backpropagate_reaches_root() {
        let mut tree = MCTSTree::new(PlayerId::new(0));
        let child = tree.add_child(tree.root(), Action::PassMainPhase);
        let grandchild = tree.add_child(child, Action::PassBattlePhase);

        tree.backpropagate(grandchild, Scores { grade: 1.0, damage: 0.5 });

        for id in [tree.root(), child, grandchild] {
            assert_eq!(tree.get(id).visits, 1);
            assert_eq!(tree.get(id).damage_total, 0.5);
        }
    }

    #[test]
    fn test_compact_keeps_subtree() {
        let mut tree = MCTSTree::new(PlayerId::new(1));
        let root = tree.root();
        let keep = tree.add_child(root, Action::PassMainPhase);
        let drop = tree.add_child(root, Action::PassRidePhase);
        let under_keep = tree.add_child(keep, Action::PassBattlePhase);
        tree.add_child(drop, Action::PassBattlePhase);
        tree.backpropagate(under_keep, Scores { grade: 0.5, damage: 0.0 });

        let compacted = tree.compact(keep);

        assert_eq!(compacted.len(), 2);
        assert_eq!(compacted.searcher(), PlayerId::new(1));
        let new_root = compacted.root_node();
        assert!(new_root.parent.is_none());
        assert!(new_root.action.is_none());
        assert_eq!(new_root.visits, 1);

        let child = compacted.find_child(compacted.root(), &Action::PassBattlePhase).unwrap();
        assert_eq!(compacted.get(child).depth, 1);
        assert_eq!(compacted.get(child).parent, compacted.root());
    }

    #[test]
    fn test_root_key_matching() {
        let tree = MCTSTree::new(PlayerId::new(0));
        assert!(!tree.is_rooted_at(None));
        assert!(!tree.is_rooted_at(Some(7)));

        let mut tree = tree.with_root_key(Some(7));
        assert!(tree.is_rooted_at(Some(7)));
        assert!(!tree.is_rooted_at(Some(8)));

        let child = tree.add_child(tree.root(), Action::PassMainPhase);
        assert!(!tree.compact(child).is_rooted_at(Some(7)));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MCTSTree::new(PlayerId::new(0));
        let root = tree.root();
        let child = tree.add_child(root, Action::PassMainPhase);
        tree.add_child(root, Action::PassRidePhase);
        tree.add_child(child, Action::PassBattlePhase);

        let stats = tree.stats();

        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.total_children, 3);
        assert_eq!(stats.branching_factor(), 1.5);
    }

    #[test]
    fn test_tree_serialization() {
        let mut tree = MCTSTree::new(PlayerId::new(0));
        tree.add_child(tree.root(), Action::Pass);
        tree.get_mut(tree.root()).visits = 50;

        let json = serde_json::to_string(&tree).unwrap();
        let deserialized: MCTSTree = serde_json::from_str(&json).unwrap();

        assert_eq!(tree.len(), deserialized.len());
        assert_eq!(tree.root_node().visits, deserialized.root_node().visits);
    }
}
