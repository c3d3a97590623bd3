//! Game events and pending effects.
//!
//! Events are queued by the applier when something happens that cards
//! may react to (a ride, a call, an attack, ...). The head event's
//! reactions are collected lazily into a list of [`PendingEffect`]s the
//! first time the resolution loop looks at it.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, EffectDefinition};
use crate::core::{EntityId, PlayerId};
use crate::zones::CircleName;

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RidePhaseStart,
    Ride,
    Call,
    Attack,
    Boost,
    AttackHit,
    EndPhase,
    /// Event raised by an effect procedure, matched by name.
    Custom(String),
}

impl EventKind {
    /// Canonical trigger name, e.g. `ON_RIDE`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EventKind::RidePhaseStart => "ON_RIDE_PHASE_START",
            EventKind::Ride => "ON_RIDE",
            EventKind::Call => "ON_CALL",
            EventKind::Attack => "ON_ATTACK",
            EventKind::Boost => "ON_BOOST",
            EventKind::AttackHit => "ON_ATTACK_HIT",
            EventKind::EndPhase => "ON_END_PHASE",
            EventKind::Custom(name) => name.as_str(),
        }
    }

    /// Does an effect's trigger name refer to this event?
    ///
    /// ```
    /// use vanguard_sim::triggers::EventKind;
    ///
    /// assert!(EventKind::Ride.matches("on ride"));
    /// assert!(EventKind::RidePhaseStart.matches("onRidePhaseStart"));
    /// assert!(!EventKind::Ride.matches("ON_RIDE_PHASE_START"));
    /// ```
    #[must_use]
    pub fn matches(&self, trigger: &str) -> bool {
        normalize_trigger(self.name()) == normalize_trigger(trigger)
    }
}

/// Uppercase and strip everything but letters and digits.
#[must_use]
pub fn normalize_trigger(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Event data handed to effect procedures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    #[default]
    None,
    /// Previous and new vanguard.
    Ride { previous: Option<EntityId>, new: EntityId },
    /// The card the event is about.
    Card(EntityId),
    Attack {
        attacker: CircleName,
        target: CircleName,
        booster: Option<CircleName>,
    },
}

/// An effect waiting to resolve for the head event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingEffect {
    /// Instance that carries the effect.
    pub source: EntityId,
    /// Definition id of the source, used to match ACTIVATE_EFFECT.
    pub card: CardId,
    pub card_name: String,
    /// Index of the effect within the card's effect list.
    pub effect_index: usize,
    pub effect: EffectDefinition,
    pub payload: EventPayload,
}

impl PendingEffect {
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.effect.mandatory
    }
}

/// A queued event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The player whose cards react.
    pub player: PlayerId,
    pub payload: EventPayload,
    /// Collected on first inspection; `None` until then.
    pub pending: Option<Vec<PendingEffect>>,
}

impl GameEvent {
    #[must_use]
    pub fn new(kind: EventKind, player: PlayerId) -> Self {
        Self {
            kind,
            player,
            payload: EventPayload::None,
            pending: None,
        }
    }

    /// Set the payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Optional effects still pending. Empty if not yet collected.
    pub fn optional_effects(&self) -> impl Iterator<Item = &PendingEffect> {
        self.pending
            .iter()
            .flatten()
            .filter(|p| !p.is_mandatory())
    }
}
