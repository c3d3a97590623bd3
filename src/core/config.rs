//! Rules configuration.
//!
//! Constants of the game that a format or a test may want to change.
//! Everything has a `Default` matching standard play and `with_*`
//! builders for overrides.

use serde::{Deserialize, Serialize};

/// Deck-wide composition totals.
///
/// Deck construction guarantees these counts, which is what lets the
/// determinizer rebuild hidden zones without seeing them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckComposition {
    /// Trigger units in a main deck (all kinds, heal included).
    pub triggers: usize,
    /// Heal triggers among `triggers`.
    pub heal_triggers: usize,
    /// Units carrying the sentinel skill.
    pub sentinels: usize,
}

impl Default for DeckComposition {
    fn default() -> Self {
        Self {
            triggers: 16,
            heal_triggers: 4,
            sentinels: 4,
        }
    }
}

/// Game rule parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Cards drawn into the starting hand.
    pub starting_hand_size: usize,

    /// Damage-zone size at which a player loses.
    pub damage_to_lose: usize,

    /// Power granted by a trigger's power bonus.
    pub trigger_power: i64,

    /// Energy cap.
    pub max_energy: i64,

    /// The first player's first turn has no battle phase.
    pub first_turn_skips_battle: bool,

    /// Composition totals every main deck satisfies.
    pub composition: DeckComposition,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_hand_size: 5,
            damage_to_lose: 6,
            trigger_power: 10_000,
            max_energy: 10,
            first_turn_skips_battle: true,
            composition: DeckComposition::default(),
        }
    }
}

impl RulesConfig {
    /// Override the starting hand size.
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Override the loss threshold.
    #[must_use]
    pub fn with_damage_to_lose(mut self, damage: usize) -> Self {
        self.damage_to_lose = damage;
        self
    }

    /// Override the deck composition totals.
    #[must_use]
    pub fn with_composition(mut self, composition: DeckComposition) -> Self {
        self.composition = composition;
        self
    }

    /// Allow a battle phase on the very first turn.
    #[must_use]
    pub fn with_first_turn_battle(mut self) -> Self {
        self.first_turn_skips_battle = false;
        self
    }
}
