//! Card database and deck construction.
//!
//! The `CardDatabase` holds every card definition known to a match. Deck
//! lists (already parsed into definition ids by the caller) are turned
//! into a [`Deck`]: fully populated card instances with unique ids, a
//! ride deck sorted by grade with the grade-0 starter pulled out, and a
//! main deck.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use super::instance::Card;
use crate::core::{EngineError, EntityAllocator};
use crate::effects::EffectRegistry;

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use vanguard_sim::cards::{CardDatabase, CardDefinition, CardId};
///
/// let mut db = CardDatabase::new();
/// db.register(CardDefinition::unit(CardId::new(1), "Starter", 0, 6000));
///
/// assert_eq!(db.get(CardId::new(1)).unwrap().name, "Starter");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardDatabase {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
}

impl CardDatabase {
    /// Create a new empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, Arc::new(card));
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Create one instance of a definition.
    pub fn instantiate(
        &self,
        id: CardId,
        alloc: &mut EntityAllocator,
    ) -> Result<Card, EngineError> {
        let definition = self.get(id).ok_or(EngineError::UnknownCard(id))?;
        Ok(Card::new(alloc.alloc(), Arc::clone(definition)))
    }

    /// Build a deck from a ride-deck list and a main-deck list.
    ///
    /// Every effect referenced by a card must be registered in `effects`;
    /// this is where effect ids are resolved against the registry, so the
    /// applier never meets an unknown one mid-game.
    pub fn build_deck(
        &self,
        ride: &[CardId],
        main: &[CardId],
        effects: &EffectRegistry,
        alloc: &mut EntityAllocator,
    ) -> Result<Deck, EngineError> {
        let mut ride_cards = ride
            .iter()
            .map(|&id| self.instantiate(id, alloc))
            .collect::<Result<Vec<_>, _>>()?;
        let main_cards = main
            .iter()
            .map(|&id| self.instantiate(id, alloc))
            .collect::<Result<Vec<_>, _>>()?;

        for card in ride_cards.iter().chain(main_cards.iter()) {
            for effect in card.effects() {
                if !effects.contains(effect.effect) {
                    return Err(EngineError::UnknownEffect(effect.effect));
                }
            }
        }

        ride_cards.sort_by_key(|c| c.grade().unwrap_or(u8::MAX));
        let starter_pos = ride_cards
            .iter()
            .position(|c| c.grade() == Some(0))
            .ok_or_else(|| EngineError::illegal("ride deck has no grade 0 unit"))?;
        let starting_vanguard = ride_cards.remove(starter_pos);

        Ok(Deck {
            starting_vanguard,
            ride_deck: ride_cards,
            main_deck: main_cards,
        })
    }
}

/// A constructed deck, ready to seat a player.
#[derive(Clone, Debug)]
pub struct Deck {
    /// Grade-0 unit that starts on V.
    pub starting_vanguard: Card,
    /// Remaining ride deck, ascending by grade.
    pub ride_deck: Vec<Card>,
    /// Main deck in list order (shuffled at setup).
    pub main_deck: Vec<Card>,
}

impl Deck {
    /// Total number of cards, starter included.
    #[must_use]
    pub fn card_count(&self) -> usize {
        1 + self.ride_deck.len() + self.main_deck.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::EffectDefinition;
    use crate::effects::EffectId;

    fn db() -> CardDatabase {
        let mut db = CardDatabase::new();
        db.register(CardDefinition::unit(CardId::new(0), "G0", 0, 6000));
        db.register(CardDefinition::unit(CardId::new(1), "G1", 1, 8000));
        db.register(CardDefinition::unit(CardId::new(2), "G2", 2, 10000));
        db.register(CardDefinition::unit(CardId::new(3), "G3", 3, 13000));
        db
    }

    #[test]
    fn test_build_deck_sorts_ride_deck() {
        let db = db();
        let mut alloc = EntityAllocator::new();
        let deck = db
            .build_deck(
                &[CardId::new(3), CardId::new(1), CardId::new(0), CardId::new(2)],
                &[CardId::new(1), CardId::new(2)],
                &EffectRegistry::new(),
                &mut alloc,
            )
            .unwrap();

        assert_eq!(deck.starting_vanguard.grade(), Some(0));
        let grades: Vec<_> = deck.ride_deck.iter().map(|c| c.grade()).collect();
        assert_eq!(grades, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(deck.main_deck.len(), 2);
        assert_eq!(deck.card_count(), 6);
    }

    #[test]
    fn test_build_deck_unique_ids() {
        let db = db();
        let mut alloc = EntityAllocator::new();
        let deck = db
            .build_deck(
                &[CardId::new(0)],
                &[CardId::new(1), CardId::new(1), CardId::new(1)],
                &EffectRegistry::new(),
                &mut alloc,
            )
            .unwrap();

        let mut uids: Vec<_> = deck.main_deck.iter().map(|c| c.uid).collect();
        uids.push(deck.starting_vanguard.uid);
        uids.sort();
        uids.dedup();
        assert_eq!(uids.len(), 4);
    }

    #[test]
    fn test_unknown_card() {
        let db = db();
        let mut alloc = EntityAllocator::new();
        let err = db
            .build_deck(&[CardId::new(0)], &[CardId::new(99)], &EffectRegistry::new(), &mut alloc)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownCard(CardId::new(99)));
    }

    #[test]
    fn test_missing_starter() {
        let db = db();
        let mut alloc = EntityAllocator::new();
        let err = db
            .build_deck(&[CardId::new(1)], &[], &EffectRegistry::new(), &mut alloc)
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalAction(_)));
    }

    #[test]
    fn test_unknown_effect_rejected() {
        let mut db = db();
        db.register(
            CardDefinition::unit(CardId::new(10), "Effecty", 1, 7000)
                .with_effect(EffectDefinition::triggered("ON_CALL", EffectId::new(999))),
        );
        let mut alloc = EntityAllocator::new();
        let err = db
            .build_deck(&[CardId::new(0)], &[CardId::new(10)], &EffectRegistry::new(), &mut alloc)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownEffect(EffectId::new(999)));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_id_panics() {
        let mut db = db();
        db.register(CardDefinition::unit(CardId::new(1), "Again", 1, 8000));
    }
}
