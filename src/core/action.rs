//! Actions: the closed set of moves a driver can submit.
//!
//! Actions are produced by [`generate`](crate::rules::generate) and
//! consumed by [`Engine::apply`](crate::rules::Engine::apply). They
//! identify cards the cheapest way that stays unambiguous:
//! - hand cards that are interchangeable copies (RIDE, CALL) by definition id
//! - hand cards whose identity matters (GUARD) and board sources (ACT) by instance id
//! - board units by circle
//!
//! Serialized with a `type` tag so an external driver can speak JSON.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::cards::CardId;
use crate::zones::CircleName;

/// Where a RIDE takes its card from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideSource {
    Hand,
    RideDeck,
}

/// A complete game action.
///
/// ## Example
///
/// ```
/// use vanguard_sim::core::Action;
/// use vanguard_sim::zones::CircleName;
///
/// let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: true };
/// let json = serde_json::to_string(&attack).unwrap();
/// assert!(json.contains("\"type\":\"ATTACK\""));
/// assert_eq!(attack.kind(), "ATTACK");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Return the hand cards at these indices and redraw.
    Mulligan { redraw: Vec<usize> },

    /// Ride a card onto V.
    Ride {
        card: CardId,
        from: RideSource,
        /// Name of the hand card discarded as cost (ride deck only).
        discard: Option<String>,
    },

    PassRidePhase,

    /// Call a hand unit onto a rear-guard circle.
    Call { card: CardId, circle: CircleName },

    /// Use an activatable effect of an in-play card.
    Act { source: EntityId, effect_index: usize },

    /// Resolve a pending optional effect of the head event.
    ActivateEffect { source: CardId, effect_index: usize },

    /// Swap the units of a column's front and back circles.
    Move { front: CircleName, back: CircleName },

    Attack {
        attacker: CircleName,
        target: CircleName,
        boost: bool,
    },

    /// Put a hand card into the guardian zone.
    Guard { card: EntityId },

    /// Move a front-row rear-guard into the guardian zone.
    Intercept { circle: CircleName },

    PassEffect,
    PassMainPhase,
    PassBattlePhase,
    PassGuardStep,

    /// Run the event queue without a choice.
    ProcessEvents,

    /// Advance an automatic phase; a no-op anywhere else.
    Pass,
}

impl Action {
    /// Wire name of the action type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Mulligan { .. } => "MULLIGAN",
            Action::Ride { .. } => "RIDE",
            Action::PassRidePhase => "PASS_RIDE_PHASE",
            Action::Call { .. } => "CALL",
            Action::Act { .. } => "ACT",
            Action::ActivateEffect { .. } => "ACTIVATE_EFFECT",
            Action::Move { .. } => "MOVE",
            Action::Attack { .. } => "ATTACK",
            Action::Guard { .. } => "GUARD",
            Action::Intercept { .. } => "INTERCEPT",
            Action::PassEffect => "PASS_EFFECT",
            Action::PassMainPhase => "PASS_MAIN_PHASE",
            Action::PassBattlePhase => "PASS_BATTLE_PHASE",
            Action::PassGuardStep => "PASS_GUARD_STEP",
            Action::ProcessEvents => "PROCESS_EVENTS",
            Action::Pass => "PASS",
        }
    }

    /// Is this one of the pass/skip actions?
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(
            self,
            Action::PassRidePhase
                | Action::PassEffect
                | Action::PassMainPhase
                | Action::PassBattlePhase
                | Action::PassGuardStep
                | Action::Pass
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Mulligan { redraw } => write!(f, "MULLIGAN {:?}", redraw),
            Action::Ride { card, from, discard: Some(name) } => {
                write!(f, "RIDE {} from {:?} discarding {}", card, from, name)
            }
            Action::Ride { card, from, discard: None } => write!(f, "RIDE {} from {:?}", card, from),
            Action::Call { card, circle } => write!(f, "CALL {} to {}", card, circle),
            Action::Act { source, effect_index } => write!(f, "ACT {} #{}", source, effect_index),
            Action::ActivateEffect { source, effect_index } => {
                write!(f, "ACTIVATE_EFFECT {} #{}", source, effect_index)
            }
            Action::Move { front, back } => write!(f, "MOVE {} <-> {}", front, back),
            Action::Attack { attacker, target, boost } => {
                write!(f, "ATTACK {} -> {}", attacker, target)?;
                if *boost {
                    f.write_str(" (boosted)")?;
                }
                Ok(())
            }
            Action::Guard { card } => write!(f, "GUARD {}", card),
            Action::Intercept { circle } => write!(f, "INTERCEPT {}", circle),
            other => f.write_str(other.kind()),
        }
    }
}
