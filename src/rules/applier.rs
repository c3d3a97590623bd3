//! The state transition: `(state, action) -> state'`.
//!
//! [`apply_in_place`] mutates a state the caller already cloned. After
//! every action it settles the state: queued events are resolved and
//! automatic phases (setup, stand, draw, drive check, close step, end)
//! are run until a decision is needed or the game ends.

use tracing::{debug, warn};

use super::battle;
use super::chooser::Chooser;
use super::resolution;
use super::setup;
use crate::cards::{Card, CardId};
use crate::core::{
    Action, EngineError, EntityId, GameState, Phase, PlayerId, RideSource, RulesConfig,
};
use crate::effects::{EffectContext, EffectRegistry};
use crate::triggers::{ConditionContext, ConditionEvaluator, EventKind, EventPayload, GameEvent};
use crate::zones::{CircleName, Zone};

/// Everything an action needs besides the state.
pub(crate) struct ApplyContext<'a> {
    pub config: &'a RulesConfig,
    pub effects: &'a EffectRegistry,
    pub chooser: &'a mut dyn Chooser,
}

/// Apply `action` to `state` and settle.
///
/// On `Err` the state may be partially modified; callers discard it.
pub(crate) fn apply_in_place(
    state: &mut GameState,
    action: &Action,
    ctx: &mut ApplyContext<'_>,
) -> Result<(), EngineError> {
    if state.is_game_over() {
        return match action {
            Action::Pass => Ok(()),
            _ => Err(EngineError::GameOver),
        };
    }

    let phase = state.phase;
    let unhandled = || EngineError::UnhandledAction { action: action.kind().to_string(), phase };

    match (phase, action) {
        (Phase::Mulligan, Action::Mulligan { redraw }) => setup::mulligan(state, redraw)?,

        (Phase::Ride, Action::Ride { card, from, discard }) => ride(state, *card, *from, discard.as_deref())?,
        (Phase::Ride, Action::PassRidePhase) => state.phase = Phase::Main,

        (Phase::Main, Action::Call { card, circle }) => call(state, *card, *circle)?,
        (Phase::Main, Action::Move { front, back }) => move_units(state, *front, *back)?,
        (Phase::Main, Action::Act { source, effect_index }) => act(state, ctx, *source, *effect_index)?,
        (Phase::Main, Action::PassMainPhase) => {
            state.phase = if state.turn == 1 && ctx.config.first_turn_skips_battle {
                Phase::End
            } else {
                Phase::Battle
            };
        }

        (Phase::Battle, Action::Attack { attacker, target, boost }) => {
            if state.turn == 1 && ctx.config.first_turn_skips_battle {
                return Err(EngineError::illegal("no battle on the first turn"));
            }
            battle::declare_attack(state, *attacker, *target, *boost)?;
        }
        (Phase::Battle, Action::PassBattlePhase) => state.phase = Phase::End,

        (Phase::Guard, Action::Guard { card }) => battle::guard(state, *card)?,
        (Phase::Guard, Action::Intercept { circle }) => battle::intercept(state, *circle)?,
        (Phase::Guard, Action::PassGuardStep) => state.phase = Phase::DriveCheck,

        (Phase::EffectResolution, Action::ActivateEffect { source, effect_index }) => {
            resolution::activate_effect(state, ctx, *source, *effect_index)?;
        }
        (Phase::EffectResolution, Action::PassEffect) => resolution::pass_effects(state, ctx)?,

        (_, Action::ProcessEvents) if phase != Phase::EffectResolution => {
            if state.events.is_empty() {
                warn!(%phase, "PROCESS_EVENTS with an empty queue");
            }
        }

        (phase, Action::Pass) if phase.is_automatic() => {}
        (phase, Action::Pass) => {
            warn!(%phase, "PASS outside an automatic phase; nothing to do");
            return Ok(());
        }

        _ => return Err(unhandled()),
    }

    settle(state, ctx)
}

/// Resolve events and run automatic phases until a decision is needed.
pub(crate) fn settle(state: &mut GameState, ctx: &mut ApplyContext<'_>) -> Result<(), EngineError> {
    loop {
        if state.is_game_over() {
            return Ok(());
        }
        if !state.events.is_empty() && state.phase != Phase::EffectResolution {
            resolution::process_events(state, ctx)?;
            continue;
        }
        if !state.phase.is_automatic() {
            return Ok(());
        }
        step(state, ctx)?;
    }
}

/// Run one automatic phase.
fn step(state: &mut GameState, ctx: &mut ApplyContext<'_>) -> Result<(), EngineError> {
    debug!(phase = %state.phase, turn = state.turn, player = %state.active, "step");
    match state.phase {
        Phase::Setup => setup::setup_step(state, ctx.config)?,
        Phase::Stand => stand_step(state),
        Phase::Draw => draw_step(state),
        Phase::DriveCheck => battle::drive_step(state, ctx),
        Phase::CloseStep => battle::close_step(state, ctx),
        Phase::End => end_step(state),
        other => return Err(EngineError::illegal(format!("{other} is not automatic"))),
    }
    Ok(())
}

// === Turn boundary ===

fn stand_step(state: &mut GameState) {
    let player = state.player_mut(state.active);
    for unit in player.board.units_mut() {
        unit.resting = false;
    }
    player.used_effects.clear();
    state.phase = Phase::Draw;
}

fn draw_step(state: &mut GameState) {
    let active = state.active;
    if !state.player_mut(active).draw() {
        debug!(player = %active, "draw from an empty deck");
        state.declare_loser(active);
        return;
    }
    state.phase = Phase::Ride;
    enqueue(state, GameEvent::new(EventKind::RidePhaseStart, active), Phase::Ride);
}

/// Clear per-turn state and hand the turn over.
fn end_step(state: &mut GameState) {
    let ending = state.active;
    for player in &mut state.players {
        for unit in player.board.units_mut() {
            unit.reset_transient();
        }
        let guardians = std::mem::take(&mut player.guardians);
        for card in guardians {
            battle::put_in_drop(player, card);
        }
    }
    state
        .player_mut(ending)
        .continuous_effects
        .retain(|e| !e.until_end_of_turn);
    state.battle = None;

    state.turn += 1;
    state.active = ending.opponent();
    state.phase = Phase::Stand;
    enqueue(state, GameEvent::new(EventKind::EndPhase, ending), Phase::Stand);
}

/// Queue an event and remember where to resume once the queue drains.
fn enqueue(state: &mut GameState, event: GameEvent, resume: Phase) {
    state.events.push_back(event);
    state.next_phase = Some(resume);
}

// === Ride phase ===

fn ride(
    state: &mut GameState,
    card: CardId,
    from: RideSource,
    discard: Option<&str>,
) -> Result<(), EngineError> {
    let active = state.active;
    let player = state.player_mut(active);
    let grade = player.vanguard_grade();

    let new = match from {
        RideSource::Hand => {
            let pos = player
                .hand
                .iter()
                .position(|c| c.id() == card && matches!(c.grade(), Some(g) if g == grade || g == grade + 1))
                .ok_or_else(|| EngineError::card_not_found(format!("{card} in hand at grade {grade} or {}", grade + 1)))?;
            player.hand.remove(pos)
        }
        RideSource::RideDeck => {
            let name = discard.ok_or_else(|| EngineError::illegal("riding from the ride deck needs a discard"))?;
            let ride_pos = player
                .ride_deck
                .iter()
                .position(|c| c.id() == card && c.grade() == Some(grade + 1))
                .ok_or_else(|| EngineError::card_not_found(format!("{card} in ride deck at grade {}", grade + 1)))?;
            let discard_pos = player
                .hand
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| EngineError::card_not_found(format!("{name:?} in hand")))?;
            let cost = player.hand.remove(discard_pos);
            battle::put_in_drop(player, cost);
            player.ride_deck.remove(ride_pos)
        }
    };

    let new_uid = new.uid;
    let previous = player.board.place(CircleName::V, new);
    let previous_uid = previous.as_ref().map(|c| c.uid);
    if let Some(mut old) = previous {
        old.reset_transient();
        old.resting = false;
        player.soul.push_back(old);
    }

    debug!(player = %active, card = %card, "ride");
    state.phase = Phase::Main;
    let payload = EventPayload::Ride { previous: previous_uid, new: new_uid };
    enqueue(state, GameEvent::new(EventKind::Ride, active).with_payload(payload), Phase::Main);
    Ok(())
}

// === Main phase ===

fn call(state: &mut GameState, card: CardId, circle: CircleName) -> Result<(), EngineError> {
    if circle == CircleName::V {
        return Err(EngineError::illegal("cannot call onto V"));
    }
    let active = state.active;
    let player = state.player_mut(active);
    let grade = player.vanguard_grade();

    let pos = player
        .hand
        .iter()
        .position(|c| c.id() == card && c.definition().is_unit() && c.grade().is_some_and(|g| g <= grade))
        .ok_or_else(|| EngineError::card_not_found(format!("callable {card} in hand")))?;
    let unit = player.hand.remove(pos);
    let uid = unit.uid;

    if let Some(retired) = player.board.place(circle, unit) {
        battle::put_in_drop(player, retired);
    }

    debug!(player = %active, card = %card, %circle, "call");
    enqueue(state, GameEvent::new(EventKind::Call, active).with_payload(EventPayload::Card(uid)), Phase::Main);
    Ok(())
}

/// The column pairs a MOVE can swap.
pub const MOVE_PAIRS: [(CircleName, CircleName); 2] =
    [(CircleName::R1, CircleName::R3), (CircleName::R2, CircleName::R5)];

fn move_units(state: &mut GameState, front: CircleName, back: CircleName) -> Result<(), EngineError> {
    if !MOVE_PAIRS.contains(&(front, back)) {
        return Err(EngineError::illegal(format!("cannot move between {front} and {back}")));
    }
    let board = &mut state.player_mut(state.active).board;
    if board.unit(front).is_none() && board.unit(back).is_none() {
        return Err(EngineError::card_not_found(format!("no unit on {front} or {back}")));
    }
    board.swap(front, back);
    Ok(())
}

/// Find an in-play card (board or crest) of `player`.
fn in_play_card(state: &GameState, player: PlayerId, uid: EntityId) -> Option<(Card, Zone)> {
    let p = state.player(player);
    if let Some(circle) = p.board.find(uid) {
        return p.board.unit(circle).map(|c| (c.clone(), Zone::of_circle(circle)));
    }
    p.crest.iter().find(|c| c.uid == uid).map(|c| (c.clone(), Zone::Crest))
}

fn act(
    state: &mut GameState,
    ctx: &mut ApplyContext<'_>,
    source: EntityId,
    effect_index: usize,
) -> Result<(), EngineError> {
    let active = state.active;
    let (card, zone) = in_play_card(state, active, source)
        .ok_or_else(|| EngineError::card_not_found(format!("{source} in play")))?;
    let effect = card
        .effects()
        .get(effect_index)
        .filter(|e| e.activatable)
        .ok_or_else(|| EngineError::card_not_found(format!("activatable effect {effect_index} on {source}")))?;

    if effect.zone.is_some_and(|z| z != zone) {
        return Err(EngineError::illegal(format!("effect {effect_index} of {source} not usable from {zone:?}")));
    }
    if effect.once_per_turn && state.player(active).has_used(source, effect_index) {
        return Err(EngineError::illegal(format!("effect {effect_index} of {source} already used this turn")));
    }
    if !ConditionEvaluator::holds(effect.condition.as_ref(), &ConditionContext::from_state(state)) {
        return Err(EngineError::illegal(format!("condition of effect {effect_index} on {source} does not hold")));
    }

    let cost = effect.cost;
    let player = state.player_mut(active);
    if player.energy < cost.energy {
        return Err(EngineError::UnaffordableCost {
            card: source,
            reason: format!("needs {} energy, has {}", cost.energy, player.energy),
        });
    }
    if player.soul.len() < cost.soul_blast {
        return Err(EngineError::UnaffordableCost {
            card: source,
            reason: format!("needs soul blast {}, soul has {}", cost.soul_blast, player.soul.len()),
        });
    }

    player.energy -= cost.energy;
    for _ in 0..cost.soul_blast {
        if let Some(card) = player.soul.pop_front() {
            battle::put_in_drop(player, card);
        }
    }
    if effect.once_per_turn {
        player.used_effects.push((source, effect_index));
    }

    debug!(player = %active, %source, effect_index, "act");
    let effect_ctx = EffectContext { player: active, source, payload: EventPayload::None };
    ctx.effects.invoke(effect.effect, state, &effect_ctx)?;
    if !state.events.is_empty() && state.next_phase.is_none() {
        state.next_phase = Some(Phase::Main);
    }
    Ok(())
}
