//! Determinization: one plausible completion of hidden information.
//!
//! The searcher sees its own hand, every face-up zone and the opponent's
//! revealed hand cards. It does not see the rest of the opponent's hand
//! or either deck order. Each search iteration redeals those hidden cards
//! so the tree is not built on knowledge the searcher lacks.
//!
//! ## Algorithm
//!
//! 1. Keep the opponent's public hand cards fixed.
//! 2. Pool the hidden hand cards with the opponent's deck.
//! 3. Split the pool by [`CardCategory`] and work out, from the deck-wide
//!    [`DeckComposition`], how many of each category the hidden zones
//!    must hold (total minus those already seen elsewhere).
//! 4. Keep up to that many cards of each category. Surplus cards stand in
//!    for categories that fall short, taking the definition of a card of
//!    that category; if no such card exists anywhere the shortfall is
//!    logged. Plain cards fill whatever room is left.
//! 5. Shuffle and redeal: the hand back to its original size, the rest
//!    as the deck.
//!
//! Instance ids never change, so every card is still accounted for; only
//! what the hidden copies are is redrawn.
//!
//! The state's RNG is replaced by a fork of the search RNG, so later
//! shuffles inside the iteration are not known in advance either.

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::cards::{Card, CardDefinition, Skill, TriggerKind};
use crate::core::{DeckComposition, EntityId, GameRng, GameState, PlayerId, PlayerState};

/// Composition class of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardCategory {
    HealTrigger,
    OtherTrigger,
    Sentinel,
    Plain,
}

impl CardCategory {
    const ALL: [CardCategory; 4] = [
        CardCategory::HealTrigger,
        CardCategory::OtherTrigger,
        CardCategory::Sentinel,
        CardCategory::Plain,
    ];

    #[must_use]
    pub fn of(card: &Card) -> Self {
        match card.trigger() {
            Some(TriggerKind::Heal) => CardCategory::HealTrigger,
            Some(_) => CardCategory::OtherTrigger,
            None if card.has_skill(Skill::Sentinel) => CardCategory::Sentinel,
            None => CardCategory::Plain,
        }
    }

    fn index(self) -> usize {
        match self {
            CardCategory::HealTrigger => 0,
            CardCategory::OtherTrigger => 1,
            CardCategory::Sentinel => 2,
            CardCategory::Plain => 3,
        }
    }
}

/// Per-category card counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub heal_triggers: usize,
    pub other_triggers: usize,
    pub sentinels: usize,
    pub plain: usize,
}

impl CategoryCounts {
    /// Count the cards of an iterator.
    pub fn of<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut counts = Self::default();
        for card in cards {
            *counts.slot(CardCategory::of(card)) += 1;
        }
        counts
    }

    /// All triggers, heals included.
    #[must_use]
    pub fn triggers(&self) -> usize {
        self.heal_triggers + self.other_triggers
    }

    fn slot(&mut self, category: CardCategory) -> &mut usize {
        match category {
            CardCategory::HealTrigger => &mut self.heal_triggers,
            CardCategory::OtherTrigger => &mut self.other_triggers,
            CardCategory::Sentinel => &mut self.sentinels,
            CardCategory::Plain => &mut self.plain,
        }
    }

    fn get(&self, category: CardCategory) -> usize {
        match category {
            CardCategory::HealTrigger => self.heal_triggers,
            CardCategory::OtherTrigger => self.other_triggers,
            CardCategory::Sentinel => self.sentinels,
            CardCategory::Plain => self.plain,
        }
    }
}

/// Redeals hidden zones for one search iteration.
#[derive(Clone, Debug)]
pub struct Determinizer {
    composition: DeckComposition,
    shuffle_own_deck: bool,
}

impl Default for Determinizer {
    fn default() -> Self {
        Self::new(DeckComposition::default())
    }
}

impl Determinizer {
    #[must_use]
    pub fn new(composition: DeckComposition) -> Self {
        Self { composition, shuffle_own_deck: true }
    }

    /// Also reshuffle the searcher's own deck.
    #[must_use]
    pub fn with_own_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_own_deck = shuffle;
        self
    }

    #[must_use]
    pub fn composition(&self) -> &DeckComposition {
        &self.composition
    }

    /// One completion of `state` as `searcher` could believe it.
    #[must_use]
    pub fn determinize(&self, state: &GameState, searcher: PlayerId, rng: &mut GameRng) -> GameState {
        let mut next = state.clone();
        let opponent = searcher.opponent();
        self.redeal(next.player_mut(opponent), rng);
        if self.shuffle_own_deck {
            rng.shuffle_vector(&mut next.player_mut(searcher).deck);
        }
        next.rng = rng.fork();
        next
    }

    fn redeal(&self, player: &mut PlayerState, rng: &mut GameRng) {
        let (known_hand, hidden_hand): (Vector<Card>, Vector<Card>) =
            player.hand.iter().cloned().partition(|c| c.public);
        let hand_target = hidden_hand.len();

        let mut pool = hidden_hand;
        pool.append(std::mem::take(&mut player.deck));

        // Everything outside the pool is already accounted for.
        let pool_uids: FxHashSet<EntityId> = pool.iter().map(|c| c.uid).collect();
        let known = CategoryCounts::of(player.all_cards().filter(|c| !pool_uids.contains(&c.uid)));
        let (required, overflow) = self.required(&known, pool.len());

        let mut buckets: [Vec<Card>; 4] = Default::default();
        for card in pool {
            buckets[CardCategory::of(&card).index()].push(card);
        }
        let templates = CardCategory::ALL.map(|category| template(category, &buckets, player));

        // Cards beyond a category's quota stand in for the categories
        // that fall short.
        let mut spare: Vec<Card> = Vec::new();
        for category in CardCategory::ALL {
            let bucket = &mut buckets[category.index()];
            rng.shuffle(bucket);
            let keep = required.get(category).min(bucket.len());
            spare.extend(bucket.drain(keep..));
        }
        rng.shuffle(&mut spare);

        let mut unmet = CategoryCounts::default();
        for category in CardCategory::ALL {
            let bucket = &mut buckets[category.index()];
            let want = required.get(category);
            if let Some(definition) = &templates[category.index()] {
                while bucket.len() < want {
                    let Some(card) = spare.pop() else {
                        break;
                    };
                    bucket.push(Card::new(card.uid, Arc::clone(definition)));
                }
            }
            *unmet.slot(category) = want.saturating_sub(bucket.len());
        }
        if overflow > 0 || unmet != CategoryCounts::default() {
            warn!(?unmet, overflow, ?required, "hidden cards cannot match the deck composition");
        }

        let mut merged: Vec<Card> = buckets.into_iter().flatten().chain(spare).collect();
        rng.shuffle(&mut merged);

        let mut merged: Vector<Card> = merged.into_iter().collect();
        let deck = merged.split_off(hand_target.min(merged.len()));
        let mut hand = known_hand;
        hand.append(merged);

        trace!(
            hand = hand.len(),
            deck = deck.len(),
            heals = required.heal_triggers,
            triggers = required.triggers(),
            "redealt hidden zones"
        );
        player.hand = hand;
        player.deck = deck;
    }

    /// Cards of each category a hidden pool of `pool` cards must hold,
    /// and how many required cards did not fit.
    ///
    /// Each category gets the deck-wide total minus the copies seen
    /// elsewhere, heals first, capped by what the pool can hold; plain
    /// cards fill the rest.
    fn required(&self, known: &CategoryCounts, pool: usize) -> (CategoryCounts, usize) {
        let other_total = self.composition.triggers.saturating_sub(self.composition.heal_triggers);
        let mut room = pool;
        let mut overflow = 0;
        let mut take = |total: usize, seen: usize| {
            let wanted = total.saturating_sub(seen);
            let n = wanted.min(room);
            room -= n;
            overflow += wanted - n;
            n
        };
        let heal_triggers = take(self.composition.heal_triggers, known.heal_triggers);
        let other_triggers = take(other_total, known.other_triggers);
        let sentinels = take(self.composition.sentinels, known.sentinels);
        let counts = CategoryCounts { heal_triggers, other_triggers, sentinels, plain: room };
        (counts, overflow)
    }
}

/// A definition of `category` to give a stand-in card.
///
/// Prefers the pool's own cards, then anything else the player owns.
fn template(category: CardCategory, buckets: &[Vec<Card>; 4], player: &PlayerState) -> Option<Arc<CardDefinition>> {
    buckets[category.index()]
        .first()
        .or_else(|| player.all_cards().find(|c| CardCategory::of(c) == category))
        .map(Card::shared_definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::trial::TrialMatchBuilder;

    fn opening() -> GameState {
        TrialMatchBuilder::new().build(11).unwrap().1
    }

    #[test]
    fn test_category_of() {
        let state = opening();
        let counts = CategoryCounts::of(
            state.players[1].hand.iter().chain(state.players[1].deck.iter()),
        );
        assert_eq!(counts.heal_triggers, 4);
        assert_eq!(counts.triggers(), 16);
        assert_eq!(counts.sentinels, 4);
    }

    #[test]
    fn test_hidden_zone_sizes_kept() {
        let state = opening();
        let mut rng = GameRng::new(3);
        let next = Determinizer::default().determinize(&state, PlayerId::new(0), &mut rng);

        for p in 0..2 {
            assert_eq!(next.players[p].hand.len(), state.players[p].hand.len());
            assert_eq!(next.players[p].deck.len(), state.players[p].deck.len());
            assert_eq!(next.players[p].card_count(), state.players[p].card_count());
        }
    }

    #[test]
    fn test_searcher_hand_untouched() {
        let state = opening();
        let mut rng = GameRng::new(3);
        let next = Determinizer::default().determinize(&state, PlayerId::new(0), &mut rng);

        let before: Vec<_> = state.players[0].hand.iter().map(|c| c.uid).collect();
        let after: Vec<_> = next.players[0].hand.iter().map(|c| c.uid).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_public_hand_cards_stay() {
        let mut state = opening();
        state.players[1].hand[0].public = true;
        let revealed = state.players[1].hand[0].uid;

        let mut rng = GameRng::new(9);
        for _ in 0..10 {
            let next = Determinizer::default().determinize(&state, PlayerId::new(0), &mut rng);
            assert!(next.players[1].hand.iter().any(|c| c.uid == revealed));
        }
    }

    #[test]
    fn test_redeal_varies_opponent_hand() {
        let state = opening();
        let mut rng = GameRng::new(5);
        let determinizer = Determinizer::default();

        let original: Vec<_> = state.players[1].hand.iter().map(|c| c.uid).collect();
        let changed = (0..10).any(|_| {
            let next = determinizer.determinize(&state, PlayerId::new(0), &mut rng);
            next.players[1].hand.iter().map(|c| c.uid).collect::<Vec<_>>() != original
        });
        assert!(changed);
    }

    fn composition(triggers: usize, heal_triggers: usize, sentinels: usize) -> DeckComposition {
        DeckComposition { triggers, heal_triggers, sentinels }
    }

    #[test]
    fn test_shortfall_filled_from_surplus() {
        let state = opening();
        let wanted = composition(20, 8, 8);
        let determinizer = Determinizer::new(wanted);
        let mut rng = GameRng::new(17);

        for _ in 0..5 {
            let next = determinizer.determinize(&state, PlayerId::new(0), &mut rng);
            let counts = CategoryCounts::of(next.players[1].all_cards());
            assert_eq!(counts.heal_triggers, 8);
            assert_eq!(counts.triggers(), 20);
            assert_eq!(counts.sentinels, 8);
            assert_eq!(next.players[1].card_count(), state.players[1].card_count());
        }
    }

    #[test]
    fn test_surplus_triggers_become_plain() {
        let state = opening();
        let mut rng = GameRng::new(2);
        let next = Determinizer::new(composition(8, 2, 0)).determinize(&state, PlayerId::new(0), &mut rng);

        let counts = CategoryCounts::of(next.players[1].all_cards());
        assert_eq!(counts.heal_triggers, 2);
        assert_eq!(counts.triggers(), 8);
        assert_eq!(counts.sentinels, 0);
    }

    #[test]
    fn test_unreachable_composition_keeps_every_card() {
        let state = opening();
        let mut rng = GameRng::new(4);
        let next = Determinizer::new(composition(200, 100, 100)).determinize(&state, PlayerId::new(0), &mut rng);

        let uids = |p: &PlayerState| {
            let mut uids: Vec<_> = p.all_cards().map(|c| c.uid).collect();
            uids.sort();
            uids
        };
        assert_eq!(uids(&next.players[1]), uids(&state.players[1]));
        assert_eq!(next.players[1].hand.len(), state.players[1].hand.len());
        // The pool holds fewer cards than the heal total alone.
        let pool = state.players[1].hand.len() + state.players[1].deck.len();
        assert_eq!(CategoryCounts::of(next.players[1].all_cards()).heal_triggers, pool);
    }

    #[test]
    fn test_matching_composition_keeps_definitions() {
        let state = opening();
        let mut rng = GameRng::new(8);
        let next = Determinizer::default().determinize(&state, PlayerId::new(0), &mut rng);

        let ids = |p: &PlayerState| {
            let mut ids: Vec<_> = p.all_cards().map(|c| (c.uid, c.id())).collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&next.players[1]), ids(&state.players[1]));
    }

    #[test]
    fn test_own_deck_order_kept_without_shuffle() {
        let state = opening();
        let mut rng = GameRng::new(5);
        let next = Determinizer::default()
            .with_own_shuffle(false)
            .determinize(&state, PlayerId::new(0), &mut rng);

        let before: Vec<_> = state.players[0].deck.iter().map(|c| c.uid).collect();
        let after: Vec<_> = next.players[0].deck.iter().map(|c| c.uid).collect();
        assert_eq!(before, after);
    }
}
