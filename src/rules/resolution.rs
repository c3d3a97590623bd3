//! Event queue resolution.
//!
//! The head event's pending effects are collected the first time the
//! loop looks at it. Mandatory effects resolve one by one; each is
//! removed from the pending list BEFORE its procedure runs, so an effect
//! that raises the same event again cannot re-trigger itself from the
//! same list. Once only optional effects remain the loop stops in
//! `effect_resolution` and waits for ACTIVATE_EFFECT or PASS_EFFECT. A
//! drained event is popped; an empty queue resumes `next_phase`.

use tracing::debug;

use super::applier::ApplyContext;
use crate::cards::CardId;
use crate::core::{EngineError, GameState, Phase};
use crate::effects::EffectContext;
use crate::triggers::{collect_pending_effects, PendingEffect};

/// Run the queue until it drains, an optional choice is needed, or the
/// game ends.
pub(crate) fn process_events(state: &mut GameState, ctx: &mut ApplyContext<'_>) -> Result<(), EngineError> {
    loop {
        if state.is_game_over() {
            return Ok(());
        }

        let Some(head) = state.events.front() else {
            let resume = state.next_phase.take().unwrap_or(Phase::Main);
            debug!(phase = %resume, "event queue drained");
            state.phase = resume;
            return Ok(());
        };

        if head.pending.is_none() {
            let head = head.clone();
            let collected = collect_pending_effects(state, &head);
            if let Some(event) = state.events.get_mut(0) {
                event.pending = Some(collected);
            }
        }

        if let Some(effect) = take_mandatory(state) {
            invoke(state, ctx, &effect)?;
            continue;
        }

        let has_optional = state
            .events
            .front()
            .is_some_and(|e| e.optional_effects().next().is_some());
        if has_optional {
            state.phase = Phase::EffectResolution;
            return Ok(());
        }

        if let Some(event) = state.events.pop_front() {
            debug!(event = event.kind.name(), "event resolved");
        }
    }
}

/// Remove and return the first mandatory pending effect of the head event.
fn take_mandatory(state: &mut GameState) -> Option<PendingEffect> {
    let pending = state.events.get_mut(0)?.pending.as_mut()?;
    let pos = pending.iter().position(PendingEffect::is_mandatory)?;
    Some(pending.remove(pos))
}

fn invoke(state: &mut GameState, ctx: &mut ApplyContext<'_>, effect: &PendingEffect) -> Result<(), EngineError> {
    let player = state.events.front().map_or(state.active, |e| e.player);
    debug!(
        card = %effect.card_name,
        index = effect.effect_index,
        effect = %effect.effect.effect,
        "resolving effect"
    );
    let effect_ctx = EffectContext {
        player,
        source: effect.source,
        payload: effect.payload.clone(),
    };
    ctx.effects.invoke(effect.effect.effect, state, &effect_ctx)
}

/// Resolve one optional pending effect of the head event.
pub(crate) fn activate_effect(
    state: &mut GameState,
    ctx: &mut ApplyContext<'_>,
    source: CardId,
    effect_index: usize,
) -> Result<(), EngineError> {
    let unmatched = EngineError::UnmatchedEffect { source_card: source, effect_index };
    let pending = state
        .events
        .get_mut(0)
        .and_then(|e| e.pending.as_mut())
        .ok_or_else(|| unmatched.clone())?;
    let pos = pending
        .iter()
        .position(|p| !p.is_mandatory() && p.card == source && p.effect_index == effect_index)
        .ok_or(unmatched)?;
    let effect = pending.remove(pos);

    invoke(state, ctx, &effect)?;
    process_events(state, ctx)
}

/// Drop every optional pending effect of the head event.
pub(crate) fn pass_effects(state: &mut GameState, ctx: &mut ApplyContext<'_>) -> Result<(), EngineError> {
    if let Some(pending) = state.events.get_mut(0).and_then(|e| e.pending.as_mut()) {
        pending.retain(PendingEffect::is_mandatory);
    }
    process_events(state, ctx)
}
