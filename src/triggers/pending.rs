//! Pending-effect collection.
//!
//! Finds every effect that reacts to an event: the triggering player's
//! board, ride deck, crest and soul are scanned for effect definitions
//! whose trigger name matches, whose zone restriction matches the card's
//! current zone and whose condition holds.

use tracing::debug;

use super::condition::{ConditionContext, ConditionEvaluator};
use super::event::{GameEvent, PendingEffect};
use crate::cards::Card;
use crate::core::GameState;
use crate::zones::Zone;

/// Collect the pending effects for `event`, in scan order.
#[must_use]
pub fn collect_pending_effects(state: &GameState, event: &GameEvent) -> Vec<PendingEffect> {
    let player = state.player(event.player);
    let ctx = ConditionContext::from_state(state);

    let board = player
        .board
        .units()
        .map(|(circle, card)| (Zone::of_circle(circle), card));
    let ride_deck = player.ride_deck.iter().map(|c| (Zone::RideDeck, c));
    let crest = player.crest.iter().map(|c| (Zone::Crest, c));
    let soul = player.soul.iter().map(|c| (Zone::Soul, c));

    let mut pending = Vec::new();
    for (zone, card) in board.chain(ride_deck).chain(crest).chain(soul) {
        collect_from_card(card, zone, event, &ctx, &mut pending);
    }

    debug!(
        event = event.kind.name(),
        player = %event.player,
        count = pending.len(),
        "collected pending effects"
    );
    pending
}

fn collect_from_card(
    card: &Card,
    zone: Zone,
    event: &GameEvent,
    ctx: &ConditionContext,
    out: &mut Vec<PendingEffect>,
) {
    for (index, effect) in card.effects().iter().enumerate() {
        if effect.activatable || !event.kind.matches(&effect.trigger) {
            continue;
        }
        if effect.zone.is_some_and(|required| required != zone) {
            continue;
        }
        if !ConditionEvaluator::holds(effect.condition.as_ref(), ctx) {
            continue;
        }
        out.push(PendingEffect {
            source: card.uid,
            card: card.id(),
            card_name: card.name().to_string(),
            effect_index: index,
            effect: effect.clone(),
            payload: event.payload.clone(),
        });
    }
}
