//! Rules integration tests: turn flow, battle, triggers and effects.

use std::sync::Arc;

use vanguard_sim::cards::{Card, CardDefinition, CardId, Cost, Deck, EffectDefinition, Skill, TriggerKind};
use vanguard_sim::core::{Action, EngineError, EntityId, GameState, Phase, PlayerId, RideSource};
use vanguard_sim::effects::builtin;
use vanguard_sim::games::trial::{ids, TrialMatchBuilder};
use vanguard_sim::rules::{ChoiceKind, ChoiceRequest, Chooser, Engine, RulesEngine};
use vanguard_sim::zones::{CircleName, Zone};

// =============================================================================
// Fixtures
// =============================================================================

fn def(id: u32, grade: u8, power: i64) -> CardDefinition {
    CardDefinition::unit(CardId::new(id), format!("Unit {id}"), grade, power)
}

fn card(uid: u32, definition: CardDefinition) -> Card {
    Card::new(EntityId(uid), Arc::new(definition))
}

/// Both players past the mulligan with every zone empty.
fn empty_state() -> GameState {
    let deck = |uid| Deck {
        starting_vanguard: card(uid, def(0, 0, 5000)),
        ride_deck: Vec::new(),
        main_deck: Vec::new(),
    };
    let mut state = GameState::new(deck(9_000), deck(9_001), 10, 7);
    for player in &mut state.players {
        player.ride_deck.clear();
        player.mulliganed = true;
    }
    state
}

/// Put `count` vanilla cards into a player's deck.
fn fill_deck(state: &mut GameState, player: usize, first_uid: u32, count: u32) {
    for uid in first_uid..first_uid + count {
        state.players[player].deck.push_back(card(uid, def(99, 1, 7000)));
    }
}

/// A battle phase on turn 3 with player 0 attacking.
fn battle_state() -> GameState {
    let mut state = empty_state();
    state.turn = 3;
    state.phase = Phase::Battle;
    fill_deck(&mut state, 0, 500, 5);
    fill_deck(&mut state, 1, 600, 5);
    state
}

/// Records every choice kind and answers with the first option.
#[derive(Default)]
struct Recorder {
    kinds: Vec<ChoiceKind>,
}

impl Chooser for Recorder {
    fn choose(&mut self, _state: &GameState, request: &ChoiceRequest) -> usize {
        assert!(!request.options.is_empty());
        self.kinds.push(request.kind);
        0
    }
}

// =============================================================================
// Turn flow
// =============================================================================

#[test]
fn test_mulligan_enumerates_every_subset() {
    let (engine, state) = TrialMatchBuilder::new().build(3).unwrap();
    let actions = engine.generate(&state);

    assert_eq!(actions.len(), 32);
    let mut subsets: Vec<Vec<usize>> = actions
        .iter()
        .map(|a| match a {
            Action::Mulligan { redraw } => redraw.clone(),
            other => panic!("unexpected {other}"),
        })
        .collect();
    subsets.sort();
    subsets.dedup();
    assert_eq!(subsets.len(), 32);
    assert!(subsets.contains(&vec![]));
    assert!(subsets.contains(&vec![0, 1, 2, 3, 4]));
}

#[test]
fn test_first_turn_flow() {
    let (engine, state) = TrialMatchBuilder::new().build(5).unwrap();
    let keep = Action::Mulligan { redraw: vec![] };

    let state = engine.try_apply(&state, &keep).unwrap();
    assert_eq!(state.phase, Phase::Mulligan);
    assert_eq!(state.decision_player(), PlayerId::new(1));

    let state = engine.try_apply(&state, &keep).unwrap();
    assert_eq!(state.phase, Phase::Ride);
    assert_eq!(state.turn, 1);
    assert_eq!(state.players[0].hand.len(), 6);
    assert!(state.events.is_empty());

    // Ride the grade 1 from the ride deck, paying with a hand card.
    let discard = state.players[0].hand[0].name().to_string();
    let ride = Action::Ride { card: ids::RIDE_G1, from: RideSource::RideDeck, discard: Some(discard) };
    assert!(engine.generate(&state).contains(&ride));

    let state = engine.try_apply(&state, &ride).unwrap();
    assert_eq!(state.phase, Phase::Main);
    let p0 = &state.players[0];
    assert_eq!(p0.vanguard_grade(), 1);
    assert_eq!(p0.hand.len(), 5);
    assert_eq!(p0.soul.len(), 1);
    assert_eq!(p0.drop.len(), 1);
    assert_eq!(p0.ride_deck.len(), 2);

    // No battle on the first turn: straight to the opponent's ride phase.
    let state = engine.try_apply(&state, &Action::PassMainPhase).unwrap();
    assert_eq!(state.turn, 2);
    assert_eq!(state.active, PlayerId::new(1));
    assert_eq!(state.phase, Phase::Ride);
    assert_eq!(state.players[1].hand.len(), 6);
}

#[test]
fn test_first_turn_attack_rejected() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.turn = 1;
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 8000)));
    state.players[1].board.place(CircleName::V, card(2, def(30, 1, 8000)));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    assert!(matches!(engine.try_apply(&state, &attack), Err(EngineError::IllegalAction(_))));
}

#[test]
fn test_main_phase_call_and_move() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.phase = Phase::Main;
    state.players[0].board.place(CircleName::V, card(1, def(20, 2, 10000)));
    state.players[0].hand.push_back(card(2, def(21, 2, 9000)));

    let call = Action::Call { card: CardId::new(21), circle: CircleName::R1 };
    let state = engine.try_apply(&state, &call).unwrap();
    assert_eq!(state.phase, Phase::Main);
    assert_eq!(state.players[0].board.unit(CircleName::R1).map(|c| c.uid), Some(EntityId(2)));

    let moved = engine
        .try_apply(&state, &Action::Move { front: CircleName::R1, back: CircleName::R3 })
        .unwrap();
    assert!(moved.players[0].board.unit(CircleName::R1).is_none());
    assert_eq!(moved.players[0].board.unit(CircleName::R3).map(|c| c.uid), Some(EntityId(2)));
}

#[test]
fn test_call_over_occupied_circle_retires_unit() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.phase = Phase::Main;
    state.players[0].board.place(CircleName::V, card(1, def(20, 2, 10000)));
    state.players[0].board.place(CircleName::R2, card(2, def(21, 1, 8000)));
    state.players[0].hand.push_back(card(3, def(22, 1, 8000)));

    let call = Action::Call { card: CardId::new(22), circle: CircleName::R2 };
    let state = engine.try_apply(&state, &call).unwrap();

    assert_eq!(state.players[0].board.unit(CircleName::R2).map(|c| c.uid), Some(EntityId(3)));
    assert!(state.players[0].drop.iter().any(|c| c.uid == EntityId(2)));
}

// =============================================================================
// Battle
// =============================================================================

#[test]
fn test_boosted_attack_retires_rear_guard() {
    let engine = Engine::default();
    let mut state = battle_state();
    let p0 = &mut state.players[0];
    p0.board.place(CircleName::V, card(1, def(20, 1, 8000)));
    p0.board.place(CircleName::R4, card(2, def(21, 1, 7000).with_skill(Skill::Boost)));
    p0.board.place(CircleName::R2, card(3, def(22, 1, 6000)));
    let p1 = &mut state.players[1];
    p1.board.place(CircleName::V, card(10, def(30, 1, 8000)));
    p1.board.place(CircleName::R1, card(11, def(31, 1, 9000)));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::R1, boost: true };
    assert!(engine.generate(&state).contains(&attack));

    let state = engine.try_apply(&state, &attack).unwrap();
    assert_eq!(state.phase, Phase::Guard);
    assert_eq!(state.decision_player(), PlayerId::new(1));
    assert_eq!(state.battle.map(|b| b.attacker_power), Some(15000));

    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    assert_eq!(state.phase, Phase::Battle);
    assert!(state.battle.is_none());
    assert!(state.players[1].board.unit(CircleName::R1).is_none());
    assert!(state.players[1].drop.iter().any(|c| c.uid == EntityId(11)));
    let board = &state.players[0].board;
    assert!(board.unit(CircleName::V).unwrap().resting);
    assert!(board.unit(CircleName::R4).unwrap().resting);
    assert!(!board.unit(CircleName::R2).unwrap().resting);
}

#[test]
fn test_guard_stops_attack() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 10000)));
    state.players[0].board.place(CircleName::R1, card(2, def(21, 1, 8000)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 8000)));
    state.players[1].hand.push_back(card(12, def(32, 0, 5000).with_shield(10000)));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let state = engine.try_apply(&state, &Action::Guard { card: EntityId(12) }).unwrap();
    assert_eq!(state.players[1].guardians.len(), 1);

    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    assert!(state.players[1].damage.is_empty());
    assert!(state.players[1].guardians.is_empty());
    assert!(state.players[1].drop.iter().any(|c| c.uid == EntityId(12)));
    assert_eq!(state.phase, Phase::Battle);
}

#[test]
fn test_guard_step_offers_every_option() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 10000)));
    let p1 = &mut state.players[1];
    p1.board.place(CircleName::V, card(10, def(30, 1, 8000)));
    p1.board.place(CircleName::R1, card(11, def(31, 2, 9000).with_skill(Skill::Intercept)));
    let mut resting = card(12, def(31, 2, 9000).with_skill(Skill::Intercept));
    resting.resting = true;
    p1.board.place(CircleName::R2, resting);
    p1.board.place(CircleName::R3, card(13, def(31, 2, 9000).with_skill(Skill::Intercept)));
    p1.hand.push_back(card(20, def(40, 0, 5000).with_shield(15000)));
    p1.hand.push_back(card(21, def(41, 1, 8000)));
    p1.hand.push_back(card(22, CardDefinition::new(CardId::new(42), "Blessing Order")));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let actions = engine.generate(&state);

    let passes = actions.iter().filter(|a| **a == Action::PassGuardStep).count();
    assert_eq!(passes, 1);
    assert!(actions.contains(&Action::Guard { card: EntityId(20) }));
    assert!(actions.contains(&Action::Guard { card: EntityId(21) }));
    assert!(!actions.contains(&Action::Guard { card: EntityId(22) }));
    let intercepts: Vec<_> = actions
        .iter()
        .filter(|a| matches!(a, Action::Intercept { .. }))
        .collect();
    assert_eq!(intercepts, vec![&Action::Intercept { circle: CircleName::R1 }]);
}

#[test]
fn test_equal_power_hits() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 11000)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 11000)));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    assert_eq!(state.players[1].damage.len(), 1);
}

#[test]
fn test_lower_power_misses() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 10000)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 11000)));

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    assert!(state.players[1].damage.is_empty());
}

#[test]
fn test_sixth_damage_ends_game() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 10000)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 5000)));
    for uid in 700..705 {
        state.players[1].damage.push_back(card(uid, def(99, 1, 7000)));
    }

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(engine.is_terminal(&state), Some(PlayerId::new(0)));
    assert_eq!(engine.generate(&state), vec![Action::Pass]);
}

#[test]
fn test_drive_check_adds_to_hand() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 3, 13000).with_skill(Skill::TwinDrive)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 30000)));
    let deck_before = state.players[0].deck.len();

    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(&state, &attack).unwrap();
    let state = engine.try_apply(&state, &Action::PassGuardStep).unwrap();

    // Drive checks happen on the turn that attacked; the turn then ends.
    assert_eq!(state.players[0].hand.len(), 2);
    assert_eq!(state.players[0].deck.len(), deck_before - 2);
    assert!(state.players[0].trigger_zone.is_empty());
}

// =============================================================================
// Heal trigger
// =============================================================================

fn heal_state(own_damage: u32, opponent_damage: u32) -> GameState {
    let mut state = battle_state();
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 10000)));
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 5000)));
    for uid in 0..own_damage {
        state.players[1].damage.push_back(card(800 + uid, def(99, 1, 7000)));
    }
    for uid in 0..opponent_damage {
        state.players[0].damage.push_back(card(900 + uid, def(99, 1, 7000)));
    }
    let heal = def(40, 0, 5000).with_trigger(TriggerKind::Heal).with_shield(20000);
    state.players[1].deck.push_back(card(51, heal));
    state
}

fn attack_with_recorder(state: &GameState) -> (GameState, Recorder) {
    let engine = Engine::default();
    let attack = Action::Attack { attacker: CircleName::V, target: CircleName::V, boost: false };
    let state = engine.try_apply(state, &attack).unwrap();

    let mut recorder = Recorder::default();
    let state = engine
        .try_apply_with(&state, &Action::PassGuardStep, &mut recorder)
        .unwrap();
    (state, recorder)
}

#[test]
fn test_heal_offered_when_not_behind() {
    let (state, recorder) = attack_with_recorder(&heal_state(3, 2));

    assert_eq!(recorder.kinds, vec![ChoiceKind::PowerTarget, ChoiceKind::HealTarget]);
    // One healed, the heal trigger itself added.
    assert_eq!(state.players[1].damage.len(), 3);
    assert!(state.players[1].damage.iter().any(|c| c.uid == EntityId(51)));
    assert!(state.players[1].drop.iter().any(|c| c.uid == EntityId(800)));
}

#[test]
fn test_heal_not_offered_when_behind() {
    let (state, recorder) = attack_with_recorder(&heal_state(1, 2));

    assert_eq!(recorder.kinds, vec![ChoiceKind::PowerTarget]);
    assert_eq!(state.players[1].damage.len(), 2);
}

// =============================================================================
// Effects
// =============================================================================

fn main_state_with_caller() -> GameState {
    let mut state = battle_state();
    state.phase = Phase::Main;
    state.players[0].board.place(CircleName::V, card(1, def(20, 1, 8000)));
    let caller = def(25, 1, 7000)
        .with_effect(EffectDefinition::triggered("ON_CALL", builtin::ENERGY_CHARGE).in_zone(Zone::RearGuard))
        .with_effect(
            EffectDefinition::triggered("on call", builtin::SOUL_CHARGE)
                .optional()
                .in_zone(Zone::RearGuard),
        );
    state.players[0].hand.push_back(card(2, caller));
    state
}

#[test]
fn test_optional_effect_waits_for_choice() {
    let engine = Engine::default();
    let state = main_state_with_caller();

    let call = Action::Call { card: CardId::new(25), circle: CircleName::R1 };
    let state = engine.try_apply(&state, &call).unwrap();

    // The mandatory charge already resolved.
    assert_eq!(state.players[0].energy, 3);
    assert_eq!(state.phase, Phase::EffectResolution);
    assert_eq!(
        engine.generate(&state),
        vec![Action::ActivateEffect { source: CardId::new(25), effect_index: 1 }, Action::PassEffect]
    );

    let activated = engine
        .try_apply(&state, &Action::ActivateEffect { source: CardId::new(25), effect_index: 1 })
        .unwrap();
    assert_eq!(activated.phase, Phase::Main);
    assert_eq!(activated.players[0].soul.len(), 1);
    assert!(activated.events.is_empty());

    let passed = engine.try_apply(&state, &Action::PassEffect).unwrap();
    assert_eq!(passed.phase, Phase::Main);
    assert!(passed.players[0].soul.is_empty());
    assert!(passed.events.is_empty());
    assert!(passed.next_phase.is_none());
}

#[test]
fn test_unmatched_effect_rejected() {
    let engine = Engine::default();
    let state = main_state_with_caller();
    let call = Action::Call { card: CardId::new(25), circle: CircleName::R1 };
    let state = engine.try_apply(&state, &call).unwrap();

    let wrong = Action::ActivateEffect { source: CardId::new(25), effect_index: 0 };
    assert!(matches!(engine.try_apply(&state, &wrong), Err(EngineError::UnmatchedEffect { .. })));

    let unchanged = engine.apply(&state, &wrong);
    assert_eq!(unchanged.snapshot_bytes().unwrap(), state.snapshot_bytes().unwrap());
}

#[test]
fn test_act_cost_and_once_per_turn() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.phase = Phase::Main;
    let commander = def(20, 3, 13000).with_effect(
        EffectDefinition::activated(builtin::VANGUARD_POWER)
            .in_zone(Zone::Vanguard)
            .with_cost(Cost::energy(3)),
    );
    state.players[0].board.place(CircleName::V, card(1, commander));
    let act = Action::Act { source: EntityId(1), effect_index: 0 };

    assert!(matches!(engine.try_apply(&state, &act), Err(EngineError::UnaffordableCost { .. })));

    state.players[0].energy = 4;
    let state = engine.try_apply(&state, &act).unwrap();
    assert_eq!(state.players[0].energy, 1);
    assert_eq!(state.players[0].board.vanguard().unwrap().bonus_power, 10000);
    assert!(!engine.generate(&state).contains(&act));

    assert!(matches!(engine.try_apply(&state, &act), Err(EngineError::IllegalAction(_))));
}

#[test]
fn test_soul_blast_moves_oldest_soul_to_drop() {
    let engine = Engine::default();
    let mut state = battle_state();
    state.phase = Phase::Main;
    let blaster = def(20, 2, 10000).with_effect(
        EffectDefinition::activated(builtin::DRAW_CARD).with_cost(Cost::soul_blast(1)),
    );
    state.players[0].board.place(CircleName::V, card(1, blaster));
    state.players[0].soul.push_back(card(2, def(21, 0, 5000)));
    state.players[0].soul.push_back(card(3, def(22, 1, 8000)));

    let state = engine
        .try_apply(&state, &Action::Act { source: EntityId(1), effect_index: 0 })
        .unwrap();

    assert_eq!(state.players[0].soul.len(), 1);
    assert!(state.players[0].drop.iter().any(|c| c.uid == EntityId(2)));
    assert_eq!(state.players[0].hand.len(), 1);
}

#[test]
fn test_end_phase_clears_turn_state() {
    let engine = Engine::default();
    let mut state = battle_state();
    let mut vanguard = card(1, def(20, 1, 8000));
    vanguard.bonus_power = 5000;
    vanguard.resting = true;
    state.players[0].board.place(CircleName::V, vanguard);
    state.players[1].board.place(CircleName::V, card(10, def(30, 1, 8000)));
    state.players[1].used_effects.push((EntityId(10), 0));

    let state = engine.try_apply(&state, &Action::PassBattlePhase).unwrap();

    assert_eq!(state.active, PlayerId::new(1));
    assert_eq!(state.turn, 4);
    assert_eq!(state.phase, Phase::Ride);
    assert_eq!(state.players[0].board.vanguard().unwrap().bonus_power, 0);
    assert!(state.players[1].used_effects.is_empty());
}
