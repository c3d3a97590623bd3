//! Game state.
//!
//! ## GameState
//!
//! The complete state of a match:
//! - Both players' zones and boards
//! - Turn counter, active player, phase
//! - The in-progress battle, if any
//! - The event queue and the phase to resume once it drains
//! - The RNG used for every shuffle
//!
//! States are values. The rules engine never mutates a state it was
//! handed; it clones and returns the clone. Zones are persistent vectors,
//! so that clone is cheap enough for MCTS.

use std::hash::Hasher;

use im::Vector;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PlayerState};
use super::rng::GameRng;
use crate::cards::Deck;
use crate::triggers::GameEvent;
use crate::zones::CircleName;

/// Phases of a turn, plus the match-level setup, mulligan and game-over
/// phases and the effect-resolution sub-phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Mulligan,
    Stand,
    Draw,
    Ride,
    Main,
    Battle,
    Guard,
    DriveCheck,
    CloseStep,
    End,
    /// Waiting for a choice among optional pending effects.
    EffectResolution,
    GameOver,
}

impl Phase {
    /// Phases with no decision in them. The applier runs straight
    /// through these.
    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(
            self,
            Phase::Setup | Phase::Stand | Phase::Draw | Phase::DriveCheck | Phase::CloseStep | Phase::End
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Mulligan => "mulligan",
            Phase::Stand => "stand",
            Phase::Draw => "draw",
            Phase::Ride => "ride",
            Phase::Main => "main",
            Phase::Battle => "battle",
            Phase::Guard => "guard",
            Phase::DriveCheck => "drive_check",
            Phase::CloseStep => "close_step",
            Phase::End => "end",
            Phase::EffectResolution => "effect_resolution",
            Phase::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

/// Snapshot of the attack being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Attacking circle (active player's board).
    pub attacker: CircleName,
    /// Attacked circle (defender's board).
    pub target: CircleName,
    /// Boosting circle, if boosted.
    pub booster: Option<CircleName>,
    /// Attacker power including boost and trigger bonuses.
    pub attacker_power: i64,
}

/// Complete game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    // === Players ===
    pub players: [PlayerState; 2],

    // === Game Progression ===
    /// Turn number (starts at 1).
    pub turn: u32,

    /// Whose turn it is.
    pub active: PlayerId,

    pub phase: Phase,

    // === Battle ===
    pub battle: Option<BattleRecord>,

    // === Events ===
    /// FIFO queue; the head is index 0.
    pub events: Vector<GameEvent>,

    /// Phase to enter once the event queue drains (`Main` if unset).
    pub next_phase: Option<Phase>,

    // === Outcome ===
    pub winner: Option<PlayerId>,

    // === Randomness ===
    pub rng: GameRng,
}

impl GameState {
    /// Create a match in the setup phase. Player 0 goes first.
    #[must_use]
    pub fn new(deck0: Deck, deck1: Deck, max_energy: i64, seed: u64) -> Self {
        Self {
            players: [
                PlayerState::from_deck(deck0, max_energy),
                PlayerState::from_deck(deck1, max_energy),
            ],
            turn: 1,
            active: PlayerId::new(0),
            phase: Phase::Setup,
            battle: None,
            events: Vector::new(),
            next_phase: None,
            winner: None,
            rng: GameRng::new(seed),
        }
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> &PlayerState {
        self.player(self.active)
    }

    /// The non-active player.
    #[must_use]
    pub fn defender(&self) -> PlayerId {
        self.active.opponent()
    }

    /// First player (starting from the active one) still to mulligan.
    #[must_use]
    pub fn mulligan_player(&self) -> Option<PlayerId> {
        [self.active, self.active.opponent()]
            .into_iter()
            .find(|&p| !self.player(p).mulliganed)
    }

    /// The player who must make the next decision.
    #[must_use]
    pub fn decision_player(&self) -> PlayerId {
        match self.phase {
            Phase::Mulligan => self.mulligan_player().unwrap_or(self.active),
            Phase::Guard => self.defender(),
            Phase::EffectResolution => self.events.front().map_or(self.active, |e| e.player),
            _ => self.active,
        }
    }

    // === Power ===

    /// Add power to a unit until end of turn.
    ///
    /// If that unit is the one currently attacking, the recorded attack
    /// power moves with it. Returns `false` if the circle is empty.
    pub fn add_power(&mut self, player: PlayerId, circle: CircleName, amount: i64) -> bool {
        let Some(unit) = self.player_mut(player).board.unit_mut(circle) else {
            return false;
        };
        unit.bonus_power += amount;
        if player == self.active {
            if let Some(battle) = self.battle.as_mut() {
                if battle.attacker == circle {
                    battle.attacker_power += amount;
                }
            }
        }
        true
    }

    // === Outcome ===

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// End the match with `loser` losing.
    pub fn declare_loser(&mut self, loser: PlayerId) {
        self.winner = Some(loser.opponent());
        self.phase = Phase::GameOver;
        self.events.clear();
        self.next_phase = None;
    }

    // === Snapshots ===

    /// Serialized copy of the full state.
    ///
    /// Two states with the same snapshot are indistinguishable to every
    /// caller, which makes this the reference for purity checks.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Hash of the snapshot, identifying this exact position.
    ///
    /// `None` if the state cannot be serialized.
    #[must_use]
    pub fn fingerprint(&self) -> Option<u64> {
        let bytes = self.snapshot_bytes().ok()?;
        let mut hasher = FxHasher::default();
        hasher.write(&bytes);
        Some(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition, CardId};
    use crate::core::EntityId;
    use std::sync::Arc;

    fn deck(base: u32) -> Deck {
        let def = |id, grade| Arc::new(CardDefinition::unit(CardId::new(id), "U", grade, 8000));
        Deck {
            starting_vanguard: Card::new(EntityId(base), def(0, 0)),
            ride_deck: vec![Card::new(EntityId(base + 1), def(1, 1))],
            main_deck: (2..12).map(|i| Card::new(EntityId(base + i), def(2, 1))).collect(),
        }
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(deck(0), deck(100), 10, 7);
        assert_eq!(state.turn, 1);
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.active, PlayerId::new(0));
        assert!(state.events.is_empty());
        assert!(state.winner.is_none());
    }

    #[test]
    fn test_decision_player() {
        let mut state = GameState::new(deck(0), deck(100), 10, 7);

        state.phase = Phase::Mulligan;
        assert_eq!(state.decision_player(), PlayerId::new(0));
        state.players[0].mulliganed = true;
        assert_eq!(state.decision_player(), PlayerId::new(1));

        state.phase = Phase::Guard;
        assert_eq!(state.decision_player(), PlayerId::new(1));

        state.phase = Phase::Main;
        assert_eq!(state.decision_player(), PlayerId::new(0));
    }

    #[test]
    fn test_declare_loser() {
        let mut state = GameState::new(deck(0), deck(100), 10, 7);
        state.declare_loser(PlayerId::new(1));
        assert_eq!(state.winner, Some(PlayerId::new(0)));
        assert!(state.is_game_over());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let state = GameState::new(deck(0), deck(100), 10, 7);
        let copy = state.clone();
        assert_eq!(state.snapshot_bytes().unwrap(), copy.snapshot_bytes().unwrap());
    }

    #[test]
    fn test_fingerprint_tracks_position() {
        let state = GameState::new(deck(0), deck(100), 10, 7);
        let mut moved = state.clone();
        assert_eq!(state.fingerprint(), moved.fingerprint());

        moved.phase = Phase::Main;
        assert!(state.fingerprint().is_some());
        assert_ne!(state.fingerprint(), moved.fingerprint());
    }

    #[test]
    fn test_add_power_tracks_attacker() {
        let mut state = GameState::new(deck(0), deck(100), 10, 7);
        let starter = state.players[0].ride_deck.pop_front().unwrap();
        state.players[0].board.place(CircleName::V, starter);
        state.battle = Some(BattleRecord {
            attacker: CircleName::V,
            target: CircleName::V,
            booster: None,
            attacker_power: 8000,
        });

        assert!(state.add_power(PlayerId::new(0), CircleName::V, 10000));
        assert_eq!(state.battle.unwrap().attacker_power, 18000);
        assert_eq!(state.players[0].board.vanguard().unwrap().total_power(), 18000);

        assert!(!state.add_power(PlayerId::new(0), CircleName::R1, 10000));
    }

    #[test]
    fn test_automatic_phases() {
        assert!(Phase::Stand.is_automatic());
        assert!(Phase::CloseStep.is_automatic());
        assert!(!Phase::Guard.is_automatic());
        assert!(!Phase::EffectResolution.is_automatic());
        assert_eq!(Phase::DriveCheck.to_string(), "drive_check");
    }
}
