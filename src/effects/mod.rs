//! Effect procedures for card abilities.
//!
//! - `EffectId`: Stable identifier a card definition points at
//! - `EffectRegistry`: Table from id to procedure
//! - `library`: Stock procedures (draw, energy charge, soul charge, ...)
//!
//! A procedure receives the state being built by the applier (already a
//! clone of the caller's state) and mutates it directly. It may move
//! cards, change counters or queue further events.

pub mod library;
mod registry;

pub use library::builtin;
pub use registry::{EffectContext, EffectFn, EffectId, EffectRegistry};
