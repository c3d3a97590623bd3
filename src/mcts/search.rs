//! Core MCTS search algorithm.
//!
//! Determinized MCTS: every iteration redeals the hidden zones (see
//! [`Determinizer`]) and then walks one shared tree, so statistics are
//! pooled across many plausible worlds. Because the legal actions depend
//! on the world drawn, selection only considers children whose action is
//! legal in the current iteration's state.
//!
//! ## Iteration
//!
//! 1. Determinize the root state.
//! 2. Descend: at each node, expand the first legal action that has no
//!    child yet; if every legal action has one, pick among them by UCT.
//! 3. Roll out from the reached node.
//! 4. Back up both sub-scores to the root.

use std::time::Instant;

use tracing::{debug, trace};

use super::config::MCTSConfig;
use super::determinize::Determinizer;
use super::node::NodeId;
use super::policy::{evaluate, GuardHeuristicRollout, SelectionPolicy, SimulationPolicy, UCT};
use super::stats::SearchStats;
use super::tree::MCTSTree;
use crate::core::{Action, GameRng, GameState, PlayerId};
use crate::rules::{DefaultChooser, RolloutChooser, RulesEngine};

/// A root action with its search statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedAction {
    pub action: Action,
    /// Visits to this root child; the primary ranking signal.
    pub visits: u32,
    /// Blended mean score in `[0, 1]`.
    pub score: f64,
}

/// Main MCTS search context.
///
/// Generic over the rules engine type. Owns the search tree and
/// configuration. The tree survives between searches: call
/// [`advance`](Self::advance) with the action actually played to keep
/// the matching subtree. A search from any other position rebuilds it.
pub struct MCTSSearch<E: RulesEngine> {
    /// The game rules engine.
    engine: E,

    /// Search configuration.
    config: MCTSConfig,

    /// The search tree, if one is kept.
    tree: Option<MCTSTree>,

    /// Position the tree's root stands for.
    root: Option<GameState>,

    /// Legal actions at `root`; rankings never leave this set.
    root_legal: Vec<Action>,

    /// RNG for determinization and simulations.
    rng: GameRng,

    /// Selection policy.
    selection: Box<dyn SelectionPolicy>,

    /// Simulation policy.
    simulation: Box<dyn SimulationPolicy<E>>,

    determinizer: Determinizer,

    /// Statistics of the last search.
    stats: SearchStats,
}

impl<E: RulesEngine> MCTSSearch<E> {
    /// Create a new MCTS search context.
    ///
    /// Determinization uses the deck composition of the engine's rules.
    pub fn new(engine: E, config: MCTSConfig) -> Self {
        let determinizer =
            Determinizer::new(engine.config().composition).with_own_shuffle(config.shuffle_own_deck);
        let rng = GameRng::new(config.seed);

        Self {
            engine,
            config,
            tree: None,
            root: None,
            root_legal: Vec::new(),
            rng,
            selection: Box::new(UCT),
            simulation: Box::new(GuardHeuristicRollout),
            determinizer,
            stats: SearchStats::default(),
        }
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom simulation policy.
    pub fn with_simulation<S: SimulationPolicy<E> + 'static>(mut self, simulation: S) -> Self {
        self.simulation = Box::new(simulation);
        self
    }

    /// Search from `state` for the player who decides next.
    ///
    /// Runs until the time budget, the iteration cap or the node cap is
    /// reached, whichever comes first. Returns the root actions ranked by
    /// visits; empty if the game is over.
    ///
    /// The kept tree is searched further only if its root is exactly this
    /// position (the same one searched before, or the one `advance` moved
    /// to) with the same searcher. Otherwise a fresh tree is built.
    pub fn search(&mut self, state: &GameState) -> Vec<RankedAction> {
        let start = Instant::now();
        self.stats.reset();

        if state.is_game_over() {
            self.root_legal.clear();
            return Vec::new();
        }

        let searcher = state.decision_player();
        let key = state.fingerprint();
        let tree = match self.tree.take() {
            Some(tree) if tree.searcher() == searcher && tree.is_rooted_at(key) => {
                self.stats.reused_nodes = tree.len();
                tree
            }
            stale => {
                if stale.is_some() {
                    debug!(searcher = %searcher, phase = %state.phase, "kept tree is for another position, rebuilding");
                }
                MCTSTree::with_capacity(searcher, self.config.max_nodes.min(4096)).with_root_key(key)
            }
        };
        self.tree = Some(tree);
        self.root_legal = self.engine.legal_actions(state);
        self.root = Some(state.clone());

        let deadline = start + self.config.time_budget();
        while self.stats.iterations < self.config.max_iterations
            && Instant::now() < deadline
            && self.tree_len() < self.config.max_nodes
        {
            self.iteration(state, searcher);
            self.stats.iterations += 1;
        }

        self.stats.finish(start.elapsed());
        debug!(nodes = self.tree_len(), failed = self.stats.failed_applies, "search finished: {}", self.stats);
        self.ranked()
    }

    /// Single MCTS iteration: determinize, select, expand, simulate,
    /// backpropagate.
    fn iteration(&mut self, root_state: &GameState, searcher: PlayerId) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        let mut state = self.determinizer.determinize(root_state, searcher, &mut self.rng);
        let mut current = tree.root();

        // === SELECTION / EXPANSION ===
        while !state.is_game_over() {
            let legal = self.engine.legal_actions(&state);

            let mut expanded = false;
            if tree.len() < self.config.max_nodes {
                for action in &legal {
                    if tree.find_child(current, action).is_some() {
                        continue;
                    }
                    match self.engine.try_apply_with(&state, action, &mut RolloutChooser) {
                        Ok(next) => {
                            state = next;
                            current = tree.add_child(current, action.clone());
                            self.stats.record_expansion();
                            expanded = true;
                            break;
                        }
                        Err(err) => {
                            self.stats.record_failed_apply();
                            trace!(action = %action, error = %err, "expansion skipped");
                        }
                    }
                }
            }
            if expanded {
                break;
            }

            let candidates: Vec<NodeId> = tree
                .get(current)
                .children
                .iter()
                .copied()
                .filter(|&c| tree.get(c).action.as_ref().is_some_and(|a| legal.contains(a)))
                .collect();
            let Some(child) = self.selection.select(tree, current, &candidates, &self.config) else {
                break;
            };
            let Some(action) = tree.get(child).action.clone() else {
                break;
            };
            match self.engine.try_apply_with(&state, &action, &mut RolloutChooser) {
                Ok(next) => {
                    state = next;
                    current = child;
                }
                Err(err) => {
                    self.stats.record_failed_apply();
                    trace!(action = %action, error = %err, "selected action rejected");
                    break;
                }
            }
        }

        // === SIMULATION ===
        let played = self
            .simulation
            .simulate(&self.engine, &mut state, &mut self.rng, &self.config);
        self.stats.record_rollout(tree.get(current).depth, played);

        // === BACKPROPAGATION ===
        let scores = evaluate(&state, searcher, self.engine.config(), &self.config);
        tree.backpropagate(current, scores);
    }

    fn tree_len(&self) -> usize {
        self.tree.as_ref().map_or(0, MCTSTree::len)
    }

    /// Root actions ranked by visits, most visited first.
    #[must_use]
    pub fn ranked(&self) -> Vec<RankedAction> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        let mut ranked: Vec<RankedAction> = tree
            .root_node()
            .children
            .iter()
            .filter_map(|&id| {
                let node = tree.get(id);
                let action = node.action.as_ref().filter(|a| self.root_legal.contains(a))?;
                Some(RankedAction {
                    action: action.clone(),
                    visits: node.visits,
                    score: node.mean_score(&self.config),
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.visits
                .cmp(&a.visits)
                .then(b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal))
        });
        ranked
    }

    /// The most visited root action.
    #[must_use]
    pub fn best_action(&self) -> Option<Action> {
        self.ranked().into_iter().next().map(|r| r.action)
    }

    /// Get action visit counts from root.
    ///
    /// Returns (action, visit_count) pairs in expansion order.
    pub fn action_visits(&self) -> Vec<(Action, u32)> {
        self.ranked().into_iter().map(|r| (r.action, r.visits)).collect()
    }

    /// Get action probabilities from root.
    ///
    /// Returns (action, probability) pairs where probabilities sum to ~1.0.
    pub fn action_probabilities(&self) -> Vec<(Action, f64)> {
        let visits = self.action_visits();
        let total: u32 = visits.iter().map(|(_, v)| v).sum();
        if total == 0 {
            return Vec::new();
        }
        visits
            .into_iter()
            .map(|(a, v)| (a, f64::from(v) / f64::from(total)))
            .collect()
    }

    /// Move the root to the child reached by `action`.
    ///
    /// The rest of the tree is dropped. The kept subtree is tied to the
    /// position `action` leads to under the default chooser, so the next
    /// search reuses it only from that position. If no child matches, or
    /// the action does not apply to the searched position, the whole tree
    /// is dropped and the next search starts fresh. Returns whether a
    /// subtree was kept.
    pub fn advance(&mut self, action: &Action) -> bool {
        let successor = self
            .root
            .take()
            .and_then(|root| self.engine.try_apply_with(&root, action, &mut DefaultChooser).ok());

        let next = match (self.tree.take(), successor.as_ref()) {
            (Some(tree), Some(state)) => tree
                .find_child(tree.root(), action)
                .map(|child| tree.compact(child).with_root_key(state.fingerprint())),
            _ => None,
        };
        let kept = next.is_some();
        debug!(action = %action, kept, nodes = next.as_ref().map_or(0, MCTSTree::len), "tree advanced");

        self.root_legal = successor
            .as_ref()
            .map(|state| self.engine.legal_actions(state))
            .unwrap_or_default();
        self.root = successor;
        self.tree = next;
        kept
    }

    /// Drop the tree.
    pub fn reset(&mut self) {
        self.tree = None;
        self.root = None;
        self.root_legal.clear();
    }

    /// Get search statistics.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree, if one is kept.
    pub fn tree(&self) -> Option<&MCTSTree> {
        self.tree.as_ref()
    }

    /// Get the engine reference.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get the configuration.
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }
}
