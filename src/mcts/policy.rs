//! MCTS policies for selection and simulation, and state evaluation.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: How to choose which child to descend into (UCT)
//! - `SimulationPolicy`: How to run rollouts (random, guard heuristic)

use tracing::trace;

use super::config::MCTSConfig;
use super::node::{NodeId, Scores};
use super::tree::MCTSTree;
use crate::core::{Action, GameRng, GameState, Phase, PlayerId, RulesConfig};
use crate::rules::{shield_total, RolloutChooser, RulesEngine};

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for selecting which child node to explore.
pub trait SelectionPolicy: Send + Sync {
    /// Select one of `candidates`, all children of `parent`.
    ///
    /// Returns `None` if no candidate can be chosen.
    fn select(&self, tree: &MCTSTree, parent: NodeId, candidates: &[NodeId], config: &MCTSConfig)
        -> Option<NodeId>;
}

/// UCT (Upper Confidence bound applied to Trees) selection policy.
///
/// Balances exploitation (high blended score) with exploration (low visits).
/// Formula: Q(a) + c * sqrt(ln(N) / n(a))
#[derive(Clone, Debug, Default)]
pub struct UCT;

impl SelectionPolicy for UCT {
    fn select(
        &self,
        tree: &MCTSTree,
        parent: NodeId,
        candidates: &[NodeId],
        config: &MCTSConfig,
    ) -> Option<NodeId> {
        let ln_parent = f64::from(tree.get(parent).visits.max(1)).ln();

        candidates
            .iter()
            .map(|&id| {
                let child = tree.get(id);
                let value = if child.visits == 0 {
                    f64::INFINITY
                } else {
                    child.mean_score(config)
                        + config.exploration_constant * (ln_parent / f64::from(child.visits)).sqrt()
                };
                (id, value)
            })
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }
}

// =============================================================================
// Simulation Policy
// =============================================================================

/// Policy for running simulations (rollouts) from a leaf state.
pub trait SimulationPolicy<E: RulesEngine>: Send + Sync {
    /// Play from `state` until game over or `config.rollout_depth`
    /// actions. The state is modified in place. Returns the number of
    /// actions played.
    fn simulate(&self, engine: &E, state: &mut GameState, rng: &mut GameRng, config: &MCTSConfig) -> u32;
}

/// Random simulation policy.
///
/// Plays uniformly random legal actions.
#[derive(Clone, Debug, Default)]
pub struct RandomSimulation;

impl<E: RulesEngine> SimulationPolicy<E> for RandomSimulation {
    fn simulate(&self, engine: &E, state: &mut GameState, rng: &mut GameRng, config: &MCTSConfig) -> u32 {
        let mut depth = 0;
        while depth < config.rollout_depth && !state.is_game_over() {
            let actions = engine.legal_actions(state);
            if !play_random(engine, state, actions, rng) {
                break;
            }
            depth += 1;
        }
        depth
    }
}

/// Rollouts that guard like a cautious player.
///
/// Every decision is uniformly random except the guard step. The
/// defender decides once per attack whether to try to stop it: always
/// at or above `guard_damage_threshold` damage, otherwise with
/// `guard_probability`. It then guards only if its hand shields can
/// close the gap, adding the largest shield first until the attack no
/// longer hits.
#[derive(Clone, Debug, Default)]
pub struct GuardHeuristicRollout;

impl<E: RulesEngine> SimulationPolicy<E> for GuardHeuristicRollout {
    fn simulate(&self, engine: &E, state: &mut GameState, rng: &mut GameRng, config: &MCTSConfig) -> u32 {
        let mut depth = 0;
        let mut guard_intent: Option<bool> = None;

        while depth < config.rollout_depth && !state.is_game_over() {
            let actions = engine.legal_actions(state);

            if state.phase == Phase::Guard {
                let intent = *guard_intent.get_or_insert_with(|| {
                    let damage = state.player(state.defender()).damage_count();
                    damage >= config.guard_damage_threshold || rng.gen_bool(config.guard_probability)
                });
                let choice = if intent { guard_choice(state, &actions) } else { None };
                let action = choice.unwrap_or(Action::PassGuardStep);
                if let Ok(next) = engine.try_apply_with(state, &action, &mut RolloutChooser) {
                    *state = next;
                    depth += 1;
                    continue;
                }
            } else {
                guard_intent = None;
            }

            if !play_random(engine, state, actions, rng) {
                break;
            }
            depth += 1;
        }
        depth
    }
}

/// The GUARD that best closes the current attack's gap, if the hand can
/// stop the attack at all.
fn guard_choice(state: &GameState, actions: &[Action]) -> Option<Action> {
    let battle = state.battle?;
    let defender = state.player(state.defender());
    let target = defender.board.unit(battle.target)?.total_power();
    let shortfall = battle.attacker_power - (target + shield_total(defender));
    if shortfall < 0 {
        return None;
    }

    let mut shields: Vec<(i64, &Action)> = actions
        .iter()
        .filter_map(|action| match action {
            Action::Guard { card } => defender
                .hand
                .iter()
                .find(|c| c.uid == *card)
                .and_then(|c| c.shield())
                .filter(|&s| s > 0)
                .map(|s| (s, action)),
            _ => None,
        })
        .collect();

    let available: i64 = shields.iter().map(|(s, _)| s).sum();
    if available <= shortfall {
        trace!(shortfall, available, "guard cannot stop the attack");
        return None;
    }
    shields.sort_by(|a, b| b.0.cmp(&a.0));
    shields.first().map(|(_, action)| (*action).clone())
}

/// Apply a random action, dropping ones the engine rejects.
///
/// Returns `false` when every action was rejected.
fn play_random(engine: &impl RulesEngine, state: &mut GameState, mut actions: Vec<Action>, rng: &mut GameRng) -> bool {
    while !actions.is_empty() {
        let idx = rng.gen_range_usize(0..actions.len());
        let action = actions.swap_remove(idx);
        match engine.try_apply_with(state, &action, &mut RolloutChooser) {
            Ok(next) => {
                *state = next;
                return true;
            }
            Err(err) => trace!(action = %action, error = %err, "rollout action rejected"),
        }
    }
    false
}

// =============================================================================
// Evaluation
// =============================================================================

/// Score `state` for `searcher`.
///
/// Grade: own vanguard grade over `expected_max_grade`. Damage: the
/// opponent's damage over the loss threshold. Both clamp to `[0, 1]`.
#[must_use]
pub fn evaluate(state: &GameState, searcher: PlayerId, rules: &RulesConfig, config: &MCTSConfig) -> Scores {
    let own = state.player(searcher);
    let opponent = state.player(searcher.opponent());

    let grade = f64::from(own.vanguard_grade()) / f64::from(config.expected_max_grade.max(1));
    let damage = opponent.damage_count() as f64 / rules.damage_to_lose.max(1) as f64;

    Scores {
        grade: grade.min(1.0),
        damage: damage.min(1.0),
    }
}
