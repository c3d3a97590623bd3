//! # vanguard-sim
//!
//! A rules engine for a Vanguard-style two-player card game, with a
//! Monte Carlo Tree Search advisor that plays under hidden information.
//!
//! ## Design Principles
//!
//! 1. **Pure transitions**: `apply(state, action)` returns a new state and
//!    never touches its input. Search clones freely.
//!
//! 2. **Data-driven cards**: card definitions name their effects by
//!    [`EffectId`]; the [`EffectRegistry`] maps ids to procedures.
//!
//! 3. **Recoverable errors**: no rules condition is fatal. A rejected
//!    action reports an [`EngineError`] and leaves the state unchanged.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: zones are `im::Vector`, so the clone
//!   behind every transition shares structure with its source.
//!
//! - **Event queue**: rides, calls, attacks and hits queue events. Card
//!   effects whose trigger, zone and condition match are collected per
//!   event; mandatory ones resolve on their own, optional ones wait for
//!   an ACTIVATE_EFFECT or PASS_EFFECT.
//!
//! - **Determinized MCTS**: each search iteration redeals the hidden
//!   cards consistently with the deck-wide composition.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, state, actions, RNG, configuration
//! - `zones`: Circles, the board and zone names
//! - `cards`: Card definitions, instances and deck construction
//! - `triggers`: Events, pending effects and gating conditions
//! - `effects`: Effect registry and stock procedures
//! - `rules`: Action generation and application
//! - `mcts`: Monte Carlo Tree Search advisor
//! - `games`: Ready-made card pools

pub mod cards;
pub mod core;
pub mod effects;
pub mod games;
pub mod mcts;
pub mod rules;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, BattleRecord, DeckComposition, EngineError, EntityId, GameRng, GameRngState, GameState,
    Phase, PlayerId, PlayerState, RideSource, RulesConfig,
};

pub use crate::zones::{Board, CircleName, Zone};

pub use crate::cards::{Card, CardDatabase, CardDefinition, CardId, Deck, EffectDefinition, Skill, TriggerKind};

pub use crate::rules::{Chooser, Engine, RulesEngine};

pub use crate::effects::{EffectId, EffectRegistry};

pub use crate::triggers::{Condition, EventKind, GameEvent};

pub use crate::mcts::{MCTSConfig, MCTSSearch, RankedAction, SearchStats};
