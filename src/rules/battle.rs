//! Battle: attack declaration, guarding, drive and damage checks.
//!
//! ## Flow
//!
//! ```text
//! ATTACK -> guard -> drive_check -> close_step -> battle | end
//! ```
//!
//! The attack snapshot (`BattleRecord`) carries the attacker's power so
//! that trigger bonuses landing on the attacker during the drive check
//! count toward the hit comparison.

use tracing::debug;

use super::applier::ApplyContext;
use super::chooser::{ask, ChoiceKind, ChoiceOption, ChoiceRequest};
use crate::cards::{Card, Skill, TriggerKind};
use crate::core::{BattleRecord, EngineError, EntityId, GameState, Phase, PlayerId, PlayerState};
use crate::triggers::{EventKind, EventPayload, GameEvent};
use crate::zones::{CircleName, Row};

/// Does an attack at `attacker_power` hit a unit at `target_power`
/// guarded by `shield`?
///
/// ```
/// use vanguard_sim::rules::hits;
///
/// assert!(hits(12000, 11000, 0));
/// assert!(!hits(10000, 11000, 0));
/// assert!(hits(11000, 11000, 0));
/// assert!(!hits(21000, 11000, 15000));
/// ```
#[must_use]
pub fn hits(attacker_power: i64, target_power: i64, shield: i64) -> bool {
    attacker_power >= target_power + shield
}

/// Total shield in a player's guardian zone.
#[must_use]
pub fn shield_total(player: &PlayerState) -> i64 {
    player.guardians.iter().map(|c| c.shield().unwrap_or(0)).sum()
}

/// The booster for `attacker`, if it can boost right now.
#[must_use]
pub fn ready_booster(player: &PlayerState, attacker: CircleName) -> Option<CircleName> {
    if attacker.row() != Row::Front {
        return None;
    }
    let back = attacker.column_partner();
    player
        .board
        .unit(back)
        .filter(|u| !u.resting && u.has_skill(Skill::Boost))
        .map(|_| back)
}

/// Move a card to the drop zone, clearing its per-turn state.
pub(crate) fn put_in_drop(player: &mut PlayerState, mut card: Card) {
    card.reset_transient();
    card.resting = false;
    player.drop.push_back(card);
}

// === Declaration ===

pub(crate) fn declare_attack(
    state: &mut GameState,
    attacker: CircleName,
    target: CircleName,
    boost: bool,
) -> Result<(), EngineError> {
    let active = state.active;
    let defender = state.defender();

    if attacker.row() != Row::Front || target.row() != Row::Front {
        return Err(EngineError::illegal(format!("{attacker} cannot attack {target}")));
    }
    if state.player(defender).board.unit(target).is_none() {
        return Err(EngineError::card_not_found(format!("no unit on opposing {target}")));
    }

    let player = state.player(active);
    let unit = player
        .board
        .unit(attacker)
        .ok_or_else(|| EngineError::card_not_found(format!("no unit on {attacker}")))?;
    if unit.resting {
        return Err(EngineError::illegal(format!("{attacker} is resting")));
    }

    let booster = if boost {
        let back = ready_booster(player, attacker)
            .ok_or_else(|| EngineError::illegal(format!("no ready booster behind {attacker}")))?;
        Some(back)
    } else {
        None
    };

    let mut power = 0;
    for circle in std::iter::once(attacker).chain(booster) {
        if let Some(unit) = state.player_mut(active).board.unit_mut(circle) {
            unit.resting = true;
            power += unit.total_power();
        }
    }

    debug!(%attacker, %target, power, boosted = boost, "attack declared");
    state.battle = Some(BattleRecord { attacker, target, booster, attacker_power: power });

    let payload = EventPayload::Attack { attacker, target, booster };
    state
        .events
        .push_back(GameEvent::new(EventKind::Attack, active).with_payload(payload.clone()));
    if booster.is_some() {
        state
            .events
            .push_back(GameEvent::new(EventKind::Boost, active).with_payload(payload));
    }
    state.next_phase = Some(Phase::Guard);
    state.phase = Phase::Guard;
    Ok(())
}

// === Guard step ===

pub(crate) fn guard(state: &mut GameState, uid: EntityId) -> Result<(), EngineError> {
    let defender = state.player_mut(state.defender());
    let pos = defender
        .hand_position(uid)
        .ok_or_else(|| EngineError::card_not_found(format!("{uid} not in hand")))?;
    if defender.hand[pos].shield().is_none() {
        return Err(EngineError::illegal(format!("{uid} has no shield")));
    }
    let card = defender.hand.remove(pos);
    defender.guardians.push_back(card);
    Ok(())
}

pub(crate) fn intercept(state: &mut GameState, circle: CircleName) -> Result<(), EngineError> {
    if !matches!(circle, CircleName::R1 | CircleName::R2) {
        return Err(EngineError::illegal(format!("{circle} cannot intercept")));
    }
    let defender = state.player_mut(state.defender());
    let unit = defender
        .board
        .unit(circle)
        .ok_or_else(|| EngineError::card_not_found(format!("no unit on {circle}")))?;
    if unit.resting || !unit.has_skill(Skill::Intercept) {
        return Err(EngineError::illegal(format!("unit on {circle} cannot intercept")));
    }
    if let Some(card) = defender.board.remove(circle) {
        defender.guardians.push_back(card);
    }
    Ok(())
}

// === Checks ===

/// Reveal the top card of `player`'s deck into the trigger zone.
/// Returns `false` (and ends the game) on an empty deck.
fn reveal_top(state: &mut GameState, player: PlayerId) -> bool {
    match state.player_mut(player).deck.pop_back() {
        Some(mut card) => {
            card.public = true;
            state.player_mut(player).trigger_zone.push_back(card);
            true
        }
        None => {
            debug!(%player, "check from an empty deck");
            state.declare_loser(player);
            false
        }
    }
}

/// Resolve the trigger on the card in `player`'s trigger zone, if any.
fn resolve_checked_trigger(state: &mut GameState, ctx: &mut ApplyContext<'_>, player: PlayerId) {
    let trigger = state.player(player).trigger_zone.back().and_then(Card::trigger);
    if let Some(kind) = trigger {
        resolve_trigger(state, ctx, player, kind);
    }
}

/// Apply a trigger for `player`.
pub(crate) fn resolve_trigger(
    state: &mut GameState,
    ctx: &mut ApplyContext<'_>,
    player: PlayerId,
    kind: TriggerKind,
) {
    let power = ctx.config.trigger_power;
    debug!(%player, ?kind, "trigger");

    if kind == TriggerKind::Front {
        for circle in CircleName::FRONT {
            state.add_power(player, circle, power);
        }
        return;
    }

    if let Some(ChoiceOption::Circle(circle)) = choose_unit(state, ctx, player, ChoiceKind::PowerTarget) {
        state.add_power(player, circle, power);
    }

    match kind {
        TriggerKind::Critical => {
            if let Some(ChoiceOption::Circle(circle)) =
                choose_unit(state, ctx, player, ChoiceKind::CriticalTarget)
            {
                if let Some(unit) = state.player_mut(player).board.unit_mut(circle) {
                    unit.bonus_critical += 1;
                }
            }
        }
        TriggerKind::Draw => {
            if !state.player_mut(player).draw() {
                state.declare_loser(player);
            }
        }
        TriggerKind::Heal => heal(state, ctx, player),
        TriggerKind::Front => {}
    }
}

fn choose_unit(
    state: &GameState,
    ctx: &mut ApplyContext<'_>,
    player: PlayerId,
    kind: ChoiceKind,
) -> Option<ChoiceOption> {
    let options: Vec<_> = state
        .player(player)
        .board
        .units()
        .map(|(circle, _)| ChoiceOption::Circle(circle))
        .collect();
    if options.is_empty() {
        return None;
    }
    Some(ask(ctx.chooser, state, &ChoiceRequest { kind, player, options }))
}

fn heal(state: &mut GameState, ctx: &mut ApplyContext<'_>, player: PlayerId) {
    let own = state.player(player).damage_count();
    let other = state.player(player.opponent()).damage_count();
    if own == 0 || own < other {
        debug!(%player, own, other, "heal not available");
        return;
    }

    let options: Vec<_> = state
        .player(player)
        .damage
        .iter()
        .map(|c| ChoiceOption::Card(c.uid))
        .collect();
    let choice = ask(ctx.chooser, state, &ChoiceRequest { kind: ChoiceKind::HealTarget, player, options });

    if let ChoiceOption::Card(uid) = choice {
        let p = state.player_mut(player);
        if let Some(pos) = p.damage.iter().position(|c| c.uid == uid) {
            let card = p.damage.remove(pos);
            put_in_drop(p, card);
        }
    }
}

// === Steps ===

/// Drive checks for an attacking vanguard. Always ends in `close_step`.
pub(crate) fn drive_step(state: &mut GameState, ctx: &mut ApplyContext<'_>) {
    let active = state.active;
    let drive = match state.battle {
        Some(battle) if battle.attacker == CircleName::V => {
            state.player(active).board.vanguard().map_or(0, Card::drive)
        }
        _ => 0,
    };

    for _ in 0..drive {
        if !reveal_top(state, active) {
            return;
        }
        resolve_checked_trigger(state, ctx, active);
        if state.is_game_over() {
            return;
        }
        let p = state.player_mut(active);
        if let Some(card) = p.trigger_zone.pop_back() {
            p.hand.push_back(card);
        }
    }
    state.phase = Phase::CloseStep;
}

/// Resolve the hit, clean up guardians and pick the next phase.
pub(crate) fn close_step(state: &mut GameState, ctx: &mut ApplyContext<'_>) {
    let active = state.active;
    let defender = state.defender();

    if let Some(battle) = state.battle {
        let shield = shield_total(state.player(defender));
        let target_power = state.player(defender).board.unit(battle.target).map(Card::total_power);
        let hit = target_power.is_some_and(|power| hits(battle.attacker_power, power, shield));
        debug!(power = battle.attacker_power, ?target_power, shield, hit, "close step");

        if hit {
            if battle.target == CircleName::V {
                let checks = state
                    .player(active)
                    .board
                    .unit(battle.attacker)
                    .map_or(1, Card::total_critical)
                    .max(0);
                for _ in 0..checks {
                    damage_check(state, ctx, defender);
                    if state.is_game_over() {
                        return;
                    }
                }
            } else {
                let p = state.player_mut(defender);
                if let Some(card) = p.board.remove(battle.target) {
                    put_in_drop(p, card);
                }
            }
            let payload = EventPayload::Attack {
                attacker: battle.attacker,
                target: battle.target,
                booster: battle.booster,
            };
            state
                .events
                .push_back(GameEvent::new(EventKind::AttackHit, active).with_payload(payload));
        }
    }

    let p = state.player_mut(defender);
    let guardians = std::mem::take(&mut p.guardians);
    for card in guardians {
        put_in_drop(p, card);
    }

    state.battle = None;
    let next = if state.player(active).ready_attackers().next().is_some() {
        Phase::Battle
    } else {
        Phase::End
    };
    state.phase = next;
    if !state.events.is_empty() {
        state.next_phase = Some(next);
    }
}

fn damage_check(state: &mut GameState, ctx: &mut ApplyContext<'_>, defender: PlayerId) {
    if !reveal_top(state, defender) {
        return;
    }
    resolve_checked_trigger(state, ctx, defender);
    if state.is_game_over() {
        return;
    }

    let p = state.player_mut(defender);
    if let Some(card) = p.trigger_zone.pop_back() {
        p.damage.push_back(card);
    }
    if p.damage_count() >= ctx.config.damage_to_lose {
        debug!(player = %defender, "damage threshold reached");
        state.declare_loser(defender);
    }
}
