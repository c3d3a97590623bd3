//! Game rules: action generation and state transition.
//!
//! ## Key Types
//!
//! - `Engine`: the facade (`generate`, `apply`, `try_apply`)
//! - `RulesEngine`: the interface search code is written against
//! - `Chooser`: answers the in-resolution choices triggers need
//!
//! ## Layout
//!
//! `generator` enumerates actions per phase. `applier` dispatches an
//! action and then settles the state (event queue and automatic phases).
//! `battle`, `resolution` and `setup` hold the phase-specific steps.

mod applier;
mod battle;
mod chooser;
mod engine;
mod generator;
mod resolution;
mod setup;

pub use applier::MOVE_PAIRS;
pub use battle::{hits, ready_booster, shield_total};
pub use chooser::{ChoiceKind, ChoiceOption, ChoiceRequest, Chooser, DefaultChooser, RolloutChooser};
pub use engine::{Engine, RulesEngine};
pub use generator::{generate, MULLIGAN_ENUMERATION_LIMIT};
