//! Stock effect procedures.
//!
//! A handful of generic procedures that card data can reference without
//! any custom code. Parameterized ones are constructors returning the
//! closure; `EffectRegistry::with_builtins` registers all of them under
//! the ids in [`builtin`].

use tracing::debug;

use super::registry::{EffectContext, EffectId, EffectRegistry};
use crate::core::{EngineError, GameState};
use crate::triggers::{EventKind, EventPayload, GameEvent};
use crate::zones::CircleName;

/// Ids of the stock procedures.
pub mod builtin {
    use super::EffectId;

    pub const DRAW_CARD: EffectId = EffectId::new(1);
    pub const ENERGY_CHARGE: EffectId = EffectId::new(2);
    pub const SOUL_CHARGE: EffectId = EffectId::new(3);
    pub const VANGUARD_POWER: EffectId = EffectId::new(4);
    pub const FOLLOW_UP: EffectId = EffectId::new(5);

    /// Event raised by `FOLLOW_UP`.
    pub const FOLLOW_UP_EVENT: &str = "ON_FOLLOW_UP";
}

/// Energy gained by `ENERGY_CHARGE`.
pub const ENERGY_CHARGE_AMOUNT: i64 = 3;

/// Power granted by `VANGUARD_POWER`.
pub const VANGUARD_POWER_AMOUNT: i64 = 10_000;

/// Draw one card. Drawing from an empty deck loses the game.
pub fn draw_card(state: &mut GameState, ctx: &EffectContext) -> Result<(), EngineError> {
    if !state.player_mut(ctx.player).draw() {
        debug!(player = %ctx.player, "effect draw from empty deck");
        state.declare_loser(ctx.player);
    }
    Ok(())
}

/// Gain energy, capped at the player's maximum.
pub fn energy_charge(
    amount: i64,
) -> impl Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync + 'static {
    move |state, ctx| {
        let player = state.player_mut(ctx.player);
        player.energy = (player.energy + amount).min(player.max_energy);
        Ok(())
    }
}

/// Put the top card of the deck into the soul.
pub fn soul_charge(state: &mut GameState, ctx: &EffectContext) -> Result<(), EngineError> {
    let player = state.player_mut(ctx.player);
    match player.deck.pop_back() {
        Some(card) => player.soul.push_back(card),
        None => debug!(player = %ctx.player, "soul charge with an empty deck"),
    }
    Ok(())
}

/// Give the player's vanguard power until end of turn.
pub fn vanguard_power(
    amount: i64,
) -> impl Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync + 'static {
    move |state, ctx| {
        if state.add_power(ctx.player, CircleName::V, amount) {
            Ok(())
        } else {
            Err(EngineError::card_not_found(format!("no vanguard for {}", ctx.player)))
        }
    }
}

/// Queue a named event for the same player.
pub fn raise_event(
    name: &'static str,
) -> impl Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync + 'static {
    move |state, ctx| {
        let event = GameEvent::new(EventKind::Custom(name.to_string()), ctx.player)
            .with_payload(EventPayload::Card(ctx.source));
        state.events.push_back(event);
        Ok(())
    }
}

impl EffectRegistry {
    /// A registry holding the stock procedures.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with(builtin::DRAW_CARD, "draw a card", draw_card)
            .with(builtin::ENERGY_CHARGE, "energy charge", energy_charge(ENERGY_CHARGE_AMOUNT))
            .with(builtin::SOUL_CHARGE, "soul charge", soul_charge)
            .with(builtin::VANGUARD_POWER, "vanguard power", vanguard_power(VANGUARD_POWER_AMOUNT))
            .with(builtin::FOLLOW_UP, "raise follow-up event", raise_event(builtin::FOLLOW_UP_EVENT))
    }
}
