//! Match setup and mulligan.

use tracing::debug;

use crate::core::{EngineError, GameState, Phase, RulesConfig};
use crate::zones::CircleName;

/// Place both starting vanguards, shuffle, draw opening hands.
pub(crate) fn setup_step(state: &mut GameState, config: &RulesConfig) -> Result<(), EngineError> {
    for index in 0..2 {
        let player = &mut state.players[index];
        let pos = player
            .ride_deck
            .iter()
            .position(|c| c.grade() == Some(0))
            .ok_or_else(|| EngineError::card_not_found("grade 0 starting vanguard"))?;
        let starter = player.ride_deck.remove(pos);
        player.board.place(CircleName::V, starter);

        state.rng.shuffle_vector(&mut state.players[index].deck);

        let player = &mut state.players[index];
        for _ in 0..config.starting_hand_size {
            if !player.draw() {
                return Err(EngineError::illegal("deck too small for the opening hand"));
            }
        }
    }
    debug!("setup complete");
    state.phase = Phase::Mulligan;
    Ok(())
}

/// Redraw the hand cards at `redraw` for the player currently
/// mulliganing. Replacements are drawn first, then the returned cards go
/// back into the deck and it is reshuffled.
pub(crate) fn mulligan(state: &mut GameState, redraw: &[usize]) -> Result<(), EngineError> {
    let who = state
        .mulligan_player()
        .ok_or_else(|| EngineError::illegal("mulligan already complete"))?;
    let hand_size = state.player(who).hand.len();

    let mut indices = redraw.to_vec();
    indices.sort_unstable();
    indices.dedup();
    if indices.len() != redraw.len() {
        return Err(EngineError::illegal("duplicate mulligan index"));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i >= hand_size) {
        return Err(EngineError::card_not_found(format!("hand index {bad}")));
    }
    if state.player(who).deck.len() < indices.len() {
        return Err(EngineError::illegal("not enough cards to redraw"));
    }

    let player = state.player_mut(who);
    for _ in 0..indices.len() {
        player.draw();
    }
    for &i in indices.iter().rev() {
        let card = player.hand.remove(i);
        player.deck.push_back(card);
    }
    player.mulliganed = true;
    state.rng.shuffle_vector(&mut state.players[who.index()].deck);

    debug!(player = %who, redrawn = indices.len(), "mulligan");
    if state.mulligan_player().is_none() {
        state.phase = Phase::Stand;
    }
    Ok(())
}
