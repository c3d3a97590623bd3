//! Card instances - runtime card state.
//!
//! A `Card` is one physical card in a match. It shares its definition
//! through an `Arc` (cloning a card never copies its effect list) and
//! tracks the state that changes during play.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId, EffectDefinition, Skill, TriggerKind};
use crate::core::EntityId;

/// A card instance in a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique instance id, permanent for the match.
    pub uid: EntityId,

    definition: Arc<CardDefinition>,

    /// Rested (tapped) units cannot attack or boost.
    pub resting: bool,

    /// Power added until end of turn.
    pub bonus_power: i64,

    /// Critical added until end of turn.
    pub bonus_critical: i64,

    /// Known to the opponent (revealed from hand, face-up zones).
    pub public: bool,
}

impl Card {
    /// Create a card instance.
    #[must_use]
    pub fn new(uid: EntityId, definition: Arc<CardDefinition>) -> Self {
        Self {
            uid,
            definition,
            resting: false,
            bonus_power: 0,
            bonus_critical: 0,
            public: false,
        }
    }

    /// The shared definition.
    #[must_use]
    pub fn definition(&self) -> &CardDefinition {
        &self.definition
    }

    /// Another handle to the shared definition.
    #[must_use]
    pub fn shared_definition(&self) -> Arc<CardDefinition> {
        Arc::clone(&self.definition)
    }

    /// Definition id.
    #[must_use]
    pub fn id(&self) -> CardId {
        self.definition.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn grade(&self) -> Option<u8> {
        self.definition.grade
    }

    /// Base power.
    #[must_use]
    pub fn power(&self) -> Option<i64> {
        self.definition.power
    }

    #[must_use]
    pub fn shield(&self) -> Option<i64> {
        self.definition.shield
    }

    #[must_use]
    pub fn trigger(&self) -> Option<TriggerKind> {
        self.definition.trigger
    }

    #[must_use]
    pub fn effects(&self) -> &[EffectDefinition] {
        &self.definition.effects
    }

    #[must_use]
    pub fn has_skill(&self, skill: Skill) -> bool {
        self.definition.has_skill(skill)
    }

    /// Drive checks performed when attacking as vanguard.
    #[must_use]
    pub fn drive(&self) -> usize {
        self.definition.drive()
    }

    /// Base power plus bonus power. Non-units count as 0.
    #[must_use]
    pub fn total_power(&self) -> i64 {
        self.definition.power.unwrap_or(0) + self.bonus_power
    }

    /// Base critical plus bonus critical.
    #[must_use]
    pub fn total_critical(&self) -> i64 {
        self.definition.critical + self.bonus_critical
    }

    /// Clear end-of-turn modifiers.
    pub fn reset_transient(&mut self) {
        self.bonus_power = 0;
        self.bonus_critical = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Card {
        let def = CardDefinition::unit(CardId::new(1), "Unit", 1, 8000).with_critical(2);
        Card::new(EntityId(10), Arc::new(def))
    }

    #[test]
    fn test_new_card_state() {
        let card = unit();

        assert_eq!(card.uid, EntityId(10));
        assert_eq!(card.id(), CardId::new(1));
        assert!(!card.resting);
        assert!(!card.public);
    }

    #[test]
    fn test_totals_include_bonus() {
        let mut card = unit();
        card.bonus_power = 10000;
        card.bonus_critical = 1;

        assert_eq!(card.total_power(), 18000);
        assert_eq!(card.total_critical(), 3);

        card.reset_transient();
        assert_eq!(card.total_power(), 8000);
        assert_eq!(card.total_critical(), 2);
    }

    #[test]
    fn test_clone_shares_definition() {
        let card = unit();
        let copy = card.clone();
        assert!(Arc::ptr_eq(&card.definition, &copy.definition));
    }

    #[test]
    fn test_serialization() {
        let mut card = unit();
        card.resting = true;

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: Card = serde_json::from_str(&json).unwrap();

        assert_eq!(card, deserialized);
    }
}
