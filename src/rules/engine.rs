//! The rules engine facade.
//!
//! `Engine` pairs a [`RulesConfig`] with an [`EffectRegistry`] and exposes
//! the two contracts drivers and search code rely on:
//!
//! - `generate(state)`: every legal action
//! - `apply(state, action)`: the successor state
//!
//! Application never touches its input. The state is cloned first and
//! only the clone is mutated; on error the clone is thrown away.

use tracing::warn;

use super::applier::{apply_in_place, settle, ApplyContext};
use super::chooser::{Chooser, DefaultChooser};
use super::generator::generate;
use crate::cards::Deck;
use crate::core::{Action, EngineError, GameState, PlayerId, RulesConfig};
use crate::effects::EffectRegistry;

/// Rules engine interface.
///
/// Search code is written against this trait so that a test double or a
/// variant rule set can stand in for [`Engine`].
///
/// ## Implementation Notes
///
/// - `legal_actions`: never empty
/// - `apply_action`: must be deterministic given the state (the RNG
///   lives inside the state)
/// - `is_terminal`: `None` while the game continues
pub trait RulesEngine {
    /// Rule parameters.
    fn config(&self) -> &RulesConfig;

    /// Legal actions in `state`.
    fn legal_actions(&self, state: &GameState) -> Vec<Action>;

    /// Apply an action, reporting failures.
    fn try_apply_with(
        &self,
        state: &GameState,
        action: &Action,
        chooser: &mut dyn Chooser,
    ) -> Result<GameState, EngineError>;

    /// Apply an action. Failures are logged and yield an unchanged copy.
    fn apply_action(&self, state: &GameState, action: &Action) -> GameState {
        match self.try_apply_with(state, action, &mut DefaultChooser) {
            Ok(next) => next,
            Err(err) => {
                warn!(action = %action, phase = %state.phase, error = %err, "action rejected");
                state.clone()
            }
        }
    }

    /// The winner, once the game is over.
    fn is_terminal(&self, state: &GameState) -> Option<PlayerId> {
        if state.is_game_over() {
            state.winner
        } else {
            None
        }
    }
}

/// The standard rules.
///
/// ## Example
///
/// ```
/// use vanguard_sim::rules::Engine;
///
/// let engine = Engine::default();
/// assert_eq!(engine.config().damage_to_lose, 6);
/// assert!(!engine.effects().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    config: RulesConfig,
    effects: EffectRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RulesConfig::default(), EffectRegistry::with_builtins())
    }
}

impl Engine {
    /// Create an engine.
    #[must_use]
    pub fn new(config: RulesConfig, effects: EffectRegistry) -> Self {
        Self { config, effects }
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    #[must_use]
    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// Seat two decks. The match starts in `setup`; PASS runs it.
    #[must_use]
    pub fn new_match(&self, deck0: Deck, deck1: Deck, seed: u64) -> GameState {
        GameState::new(deck0, deck1, self.config.max_energy, seed)
    }

    /// Seat two decks and run setup, leaving the state at the first
    /// mulligan decision.
    pub fn start_match(&self, deck0: Deck, deck1: Deck, seed: u64) -> Result<GameState, EngineError> {
        let state = self.new_match(deck0, deck1, seed);
        self.try_apply(&state, &Action::Pass)
    }

    /// Legal actions in `state`.
    #[must_use]
    pub fn generate(&self, state: &GameState) -> Vec<Action> {
        generate(state)
    }

    /// Apply with the default chooser, reporting failures.
    pub fn try_apply(&self, state: &GameState, action: &Action) -> Result<GameState, EngineError> {
        self.try_apply_with(state, action, &mut DefaultChooser)
    }

    /// Apply with the default chooser. Never fails.
    #[must_use]
    pub fn apply(&self, state: &GameState, action: &Action) -> GameState {
        self.apply_action(state, action)
    }

    /// Apply with a caller-supplied chooser. Never fails.
    #[must_use]
    pub fn apply_with(&self, state: &GameState, action: &Action, chooser: &mut dyn Chooser) -> GameState {
        match self.try_apply_with(state, action, chooser) {
            Ok(next) => next,
            Err(err) => {
                warn!(action = %action, phase = %state.phase, error = %err, "action rejected");
                state.clone()
            }
        }
    }

    /// Resolve queued events and automatic phases without an action.
    ///
    /// Used when a state was edited by hand (tests, scenario setup).
    pub fn settle(&self, state: &GameState) -> Result<GameState, EngineError> {
        let mut next = state.clone();
        let mut chooser = DefaultChooser;
        let mut ctx = ApplyContext { config: &self.config, effects: &self.effects, chooser: &mut chooser };
        settle(&mut next, &mut ctx)?;
        Ok(next)
    }
}

impl RulesEngine for Engine {
    fn config(&self) -> &RulesConfig {
        &self.config
    }

    fn legal_actions(&self, state: &GameState) -> Vec<Action> {
        generate(state)
    }

    fn try_apply_with(
        &self,
        state: &GameState,
        action: &Action,
        chooser: &mut dyn Chooser,
    ) -> Result<GameState, EngineError> {
        let mut next = state.clone();
        let mut ctx = ApplyContext { config: &self.config, effects: &self.effects, chooser };
        apply_in_place(&mut next, action, &mut ctx)?;
        Ok(next)
    }
}
