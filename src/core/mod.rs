//! Core engine types: entities, players, state, actions, RNG, configuration.
//!
//! Everything here is data. Behavior lives in `rules` (transitions) and
//! `mcts` (search).

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, RideSource};
pub use config::{DeckComposition, RulesConfig};
pub use entity::{EntityAllocator, EntityId};
pub use error::EngineError;
pub use player::{ContinuousEffect, PlayerId, PlayerState, PILE_ZONES};
pub use rng::{GameRng, GameRngState};
pub use state::{BattleRecord, GameState, Phase};
