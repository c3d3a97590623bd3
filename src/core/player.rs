//! Player identification and per-player game data.
//!
//! ## PlayerId
//!
//! Index of one of the two seats. `opponent()` flips it.
//!
//! ## PlayerState
//!
//! Every zone a player owns. Piles are `im::Vector<Card>` so the
//! whole-state clone taken by each `apply` shares structure with its
//! input. The top of the deck is the END of the vector.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::cards::{Card, Deck};
use crate::zones::{Board, CircleName, Zone};

/// Player identifier for a two-player match.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both player IDs in seat order.
    ///
    /// ```
    /// use vanguard_sim::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all().collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1)]);
    /// assert_eq!(players[0].opponent(), players[1]);
    /// ```
    pub fn all() -> impl Iterator<Item = PlayerId> {
        [PlayerId(0), PlayerId(1)].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// A continuous effect currently applied to a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    /// Card that created the effect.
    pub source: EntityId,
    /// Free-form description, for presentation only.
    pub description: String,
    /// Removed at the end phase.
    pub until_end_of_turn: bool,
}

/// Everything one player owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    // === Piles ===
    /// Main deck; the top card is the last element.
    pub deck: Vector<Card>,
    /// Ride deck, ascending by grade.
    pub ride_deck: Vector<Card>,
    pub hand: Vector<Card>,
    pub drop: Vector<Card>,
    pub damage: Vector<Card>,
    /// Soul; the oldest card is first.
    pub soul: Vector<Card>,
    pub g_zone: Vector<Card>,
    pub bind: Vector<Card>,
    /// Guardians of the current battle.
    pub guardians: Vector<Card>,
    /// Card being checked.
    pub trigger_zone: Vector<Card>,
    pub crest: Vector<Card>,
    pub order: Vector<Card>,

    // === Board ===
    pub board: Board,

    // === Counters ===
    pub energy: i64,
    pub max_energy: i64,

    // === Turn-scoped bookkeeping ===
    pub continuous_effects: Vec<ContinuousEffect>,
    /// (source card, effect index) pairs of once-per-turn effects used
    /// since this player's last stand phase.
    pub used_effects: Vec<(EntityId, usize)>,
    /// Has completed the mulligan step.
    pub mulliganed: bool,
}

impl PlayerState {
    /// Seat a constructed deck.
    ///
    /// The starting vanguard stays at the front of the ride deck until
    /// the setup step places it on V.
    #[must_use]
    pub fn from_deck(deck: Deck, max_energy: i64) -> Self {
        let mut ride_deck: Vector<Card> = deck.ride_deck.into_iter().collect();
        ride_deck.push_front(deck.starting_vanguard);

        Self {
            deck: deck.main_deck.into_iter().collect(),
            ride_deck,
            hand: Vector::new(),
            drop: Vector::new(),
            damage: Vector::new(),
            soul: Vector::new(),
            g_zone: Vector::new(),
            bind: Vector::new(),
            guardians: Vector::new(),
            trigger_zone: Vector::new(),
            crest: Vector::new(),
            order: Vector::new(),
            board: Board::new(),
            energy: 0,
            max_energy,
            continuous_effects: Vec::new(),
            used_effects: Vec::new(),
            mulliganed: false,
        }
    }

    // === Queries ===

    /// Grade of the current vanguard, 0 if none.
    #[must_use]
    pub fn vanguard_grade(&self) -> u8 {
        self.board.vanguard().and_then(Card::grade).unwrap_or(0)
    }

    #[must_use]
    pub fn damage_count(&self) -> usize {
        self.damage.len()
    }

    /// Position of a card in hand by instance id.
    #[must_use]
    pub fn hand_position(&self, uid: EntityId) -> Option<usize> {
        self.hand.iter().position(|c| c.uid == uid)
    }

    /// A pile zone. Board zones (`Vanguard`, `RearGuard`) return `None`.
    #[must_use]
    pub fn pile(&self, zone: Zone) -> Option<&Vector<Card>> {
        Some(match zone {
            Zone::Deck => &self.deck,
            Zone::RideDeck => &self.ride_deck,
            Zone::Hand => &self.hand,
            Zone::Drop => &self.drop,
            Zone::Damage => &self.damage,
            Zone::Soul => &self.soul,
            Zone::GZone => &self.g_zone,
            Zone::Bind => &self.bind,
            Zone::Guardian => &self.guardians,
            Zone::Trigger => &self.trigger_zone,
            Zone::Crest => &self.crest,
            Zone::Order => &self.order,
            Zone::Vanguard | Zone::RearGuard => return None,
        })
    }

    pub fn pile_mut(&mut self, zone: Zone) -> Option<&mut Vector<Card>> {
        Some(match zone {
            Zone::Deck => &mut self.deck,
            Zone::RideDeck => &mut self.ride_deck,
            Zone::Hand => &mut self.hand,
            Zone::Drop => &mut self.drop,
            Zone::Damage => &mut self.damage,
            Zone::Soul => &mut self.soul,
            Zone::GZone => &mut self.g_zone,
            Zone::Bind => &mut self.bind,
            Zone::Guardian => &mut self.guardians,
            Zone::Trigger => &mut self.trigger_zone,
            Zone::Crest => &mut self.crest,
            Zone::Order => &mut self.order,
            Zone::Vanguard | Zone::RearGuard => return None,
        })
    }

    /// Current zone of a card instance.
    #[must_use]
    pub fn zone_of(&self, uid: EntityId) -> Option<Zone> {
        if let Some(circle) = self.board.find(uid) {
            return Some(Zone::of_circle(circle));
        }
        PILE_ZONES.into_iter().find(|&zone| {
            self.pile(zone)
                .is_some_and(|pile| pile.iter().any(|c| c.uid == uid))
        })
    }

    /// Every card this player owns, in no particular order.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        PILE_ZONES
            .into_iter()
            .filter_map(|zone| self.pile(zone))
            .flat_map(|pile| pile.iter())
            .chain(self.board.units().map(|(_, card)| card))
    }

    /// Number of cards this player owns.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.all_cards().count()
    }

    /// Has this once-per-turn effect been used?
    #[must_use]
    pub fn has_used(&self, source: EntityId, effect_index: usize) -> bool {
        self.used_effects.contains(&(source, effect_index))
    }

    /// Untapped front-row units that could still attack.
    pub fn ready_attackers(&self) -> impl Iterator<Item = (CircleName, &Card)> {
        CircleName::FRONT
            .into_iter()
            .filter_map(|name| self.board.unit(name).map(|unit| (name, unit)))
            .filter(|(_, unit)| !unit.resting)
    }

    // === Mutations ===

    /// Move the top deck card to hand. Returns `false` on an empty deck.
    pub fn draw(&mut self) -> bool {
        match self.deck.pop_back() {
            Some(card) => {
                self.hand.push_back(card);
                true
            }
            None => false,
        }
    }

    /// Remove a card from hand by instance id.
    pub fn take_from_hand(&mut self, uid: EntityId) -> Option<Card> {
        let pos = self.hand_position(uid)?;
        Some(self.hand.remove(pos))
    }
}

/// Pile zones in a fixed order.
pub const PILE_ZONES: [Zone; 12] = [
    Zone::Deck,
    Zone::RideDeck,
    Zone::Hand,
    Zone::Drop,
    Zone::Damage,
    Zone::Soul,
    Zone::GZone,
    Zone::Bind,
    Zone::Guardian,
    Zone::Trigger,
    Zone::Crest,
    Zone::Order,
];
