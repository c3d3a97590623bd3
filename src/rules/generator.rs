//! Legal action enumeration.
//!
//! [`generate`] is a pure function of the state, dispatched on the
//! phase. The list it returns is never empty: every decision phase
//! carries its pass action and every other phase yields a single PASS.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::applier::MOVE_PAIRS;
use super::battle::ready_booster;
use crate::cards::{CardId, Skill};
use crate::core::{Action, GameState, Phase, PlayerState, RideSource};
use crate::triggers::{ConditionContext, ConditionEvaluator};
use crate::zones::CircleName;

/// Every action legal in `state`, in a stable order.
#[must_use]
pub fn generate(state: &GameState) -> Vec<Action> {
    match state.phase {
        Phase::Mulligan => mulligan_actions(state),
        Phase::Ride => ride_actions(state.active_player()),
        Phase::Main => main_actions(state),
        Phase::Battle => battle_actions(state),
        Phase::Guard => guard_actions(state),
        Phase::EffectResolution => effect_actions(state),
        _ => vec![Action::Pass],
    }
}

/// Hand positions the mulligan enumeration covers.
///
/// Opening hands are far smaller; cards beyond this position are always
/// kept, which bounds the action count at 2^16.
pub const MULLIGAN_ENUMERATION_LIMIT: usize = 16;

/// All 2^n redraw subsets of the mulligan player's hand.
fn mulligan_actions(state: &GameState) -> Vec<Action> {
    let Some(player) = state.mulligan_player() else {
        return vec![Action::Pass];
    };
    let n = state.player(player).hand.len().min(MULLIGAN_ENUMERATION_LIMIT);
    (0..1usize << n)
        .map(|mask| Action::Mulligan {
            redraw: (0..n).filter(|j| mask & (1 << j) != 0).collect(),
        })
        .collect()
}

fn ride_actions(player: &PlayerState) -> Vec<Action> {
    let grade = player.vanguard_grade();
    let mut actions = Vec::new();

    let mut seen = FxHashSet::default();
    for card in &player.hand {
        let fits = matches!(card.grade(), Some(g) if g == grade || g == grade + 1);
        if fits && seen.insert(card.id()) {
            actions.push(Action::Ride { card: card.id(), from: RideSource::Hand, discard: None });
        }
    }

    if let Some(next) = player.ride_deck.iter().find(|c| c.grade() == Some(grade + 1)) {
        let mut names: SmallVec<[&str; 8]> = SmallVec::new();
        for card in &player.hand {
            if !names.contains(&card.name()) {
                names.push(card.name());
            }
        }
        for name in names {
            actions.push(Action::Ride {
                card: next.id(),
                from: RideSource::RideDeck,
                discard: Some(name.to_string()),
            });
        }
    }

    actions.push(Action::PassRidePhase);
    actions
}

fn main_actions(state: &GameState) -> Vec<Action> {
    let player = state.active_player();
    let grade = player.vanguard_grade();
    let mut actions = Vec::new();

    // Calls, one per distinct callable card per rear circle.
    let mut callable: SmallVec<[CardId; 8]> = SmallVec::new();
    for card in &player.hand {
        let ok = card.definition().is_unit() && card.grade().is_some_and(|g| g <= grade);
        if ok && !callable.contains(&card.id()) {
            callable.push(card.id());
        }
    }
    for &card in &callable {
        for circle in CircleName::REAR {
            actions.push(Action::Call { card, circle });
        }
    }

    for (front, back) in MOVE_PAIRS {
        if player.board.unit(front).is_some() || player.board.unit(back).is_some() {
            actions.push(Action::Move { front, back });
        }
    }

    // Acts from board units then crest cards.
    let ctx = ConditionContext::from_state(state);
    let in_play = player
        .board
        .units()
        .map(|(_, card)| card)
        .chain(player.crest.iter());
    for card in in_play {
        for (index, effect) in card.effects().iter().enumerate() {
            if !effect.activatable {
                continue;
            }
            if effect.once_per_turn && player.has_used(card.uid, index) {
                continue;
            }
            if !ConditionEvaluator::holds(effect.condition.as_ref(), &ctx) {
                continue;
            }
            actions.push(Action::Act { source: card.uid, effect_index: index });
        }
    }

    actions.push(Action::PassMainPhase);
    actions
}

fn battle_actions(state: &GameState) -> Vec<Action> {
    let mut actions = Vec::new();
    let player = state.active_player();
    let opponent = state.player(state.defender());

    for (attacker, _) in player.ready_attackers() {
        let booster = ready_booster(player, attacker);
        for target in CircleName::FRONT {
            if opponent.board.unit(target).is_none() {
                continue;
            }
            actions.push(Action::Attack { attacker, target, boost: false });
            if booster.is_some() {
                actions.push(Action::Attack { attacker, target, boost: true });
            }
        }
    }

    actions.push(Action::PassBattlePhase);
    actions
}

fn guard_actions(state: &GameState) -> Vec<Action> {
    let defender = state.player(state.defender());
    let mut actions: Vec<Action> = defender
        .hand
        .iter()
        .filter(|c| c.shield().is_some())
        .map(|c| Action::Guard { card: c.uid })
        .collect();

    for circle in [CircleName::R1, CircleName::R2] {
        let can_intercept = defender
            .board
            .unit(circle)
            .is_some_and(|u| !u.resting && u.has_skill(Skill::Intercept));
        if can_intercept {
            actions.push(Action::Intercept { circle });
        }
    }

    actions.push(Action::PassGuardStep);
    actions
}

/// One ACTIVATE_EFFECT per distinct (card, effect) among the head
/// event's optional effects; stacked copies of a card share one action.
fn effect_actions(state: &GameState) -> Vec<Action> {
    let mut seen = FxHashSet::default();
    let mut actions: Vec<Action> = state
        .events
        .front()
        .into_iter()
        .flat_map(|event| event.optional_effects())
        .filter(|p| seen.insert((p.card, p.effect_index)))
        .map(|p| Action::ActivateEffect { source: p.card, effect_index: p.effect_index })
        .collect();
    actions.push(Action::PassEffect);
    actions
}
