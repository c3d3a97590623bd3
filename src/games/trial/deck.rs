//! Trial card pool and match builder.

use crate::cards::{CardDatabase, CardDefinition, CardId, Cost, EffectDefinition, Skill, TriggerKind};
use crate::core::{Action, EngineError, EntityAllocator, GameState, RulesConfig};
use crate::effects::{builtin, EffectRegistry};
use crate::rules::Engine;
use crate::triggers::{CompareOp, Condition};
use crate::zones::Zone;

/// Definition ids of the trial pool.
pub mod ids {
    use crate::cards::CardId;

    pub const STARTER: CardId = CardId::new(1);
    pub const RIDE_G1: CardId = CardId::new(2);
    pub const RIDE_G2: CardId = CardId::new(3);
    pub const RIDE_G3: CardId = CardId::new(4);

    pub const HEAL: CardId = CardId::new(10);
    pub const CRITICAL: CardId = CardId::new(11);
    pub const DRAW: CardId = CardId::new(12);
    pub const SENTINEL: CardId = CardId::new(13);
    pub const SQUIRE: CardId = CardId::new(14);
    pub const LANCER: CardId = CardId::new(15);
    pub const CHAMPION: CardId = CardId::new(16);
}

/// Ride deck, grade 0 to 3.
pub const RIDE_DECK: [CardId; 4] = [ids::STARTER, ids::RIDE_G1, ids::RIDE_G2, ids::RIDE_G3];

/// Main deck as (card, copies). 46 cards.
pub const MAIN_DECK: [(CardId, usize); 7] = [
    (ids::HEAL, 4),
    (ids::CRITICAL, 8),
    (ids::DRAW, 4),
    (ids::SENTINEL, 4),
    (ids::SQUIRE, 9),
    (ids::LANCER, 9),
    (ids::CHAMPION, 8),
];

fn main_list() -> Vec<CardId> {
    MAIN_DECK
        .iter()
        .flat_map(|&(id, copies)| std::iter::repeat(id).take(copies))
        .collect()
}

/// Every card the trial decks use.
#[must_use]
pub fn trial_database() -> CardDatabase {
    let mut db = CardDatabase::new();

    // Ride deck
    db.register(
        CardDefinition::unit(ids::STARTER, "Dawn Scout", 0, 6000)
            .with_skill(Skill::Boost)
            .with_shield(10000),
    );
    db.register(
        CardDefinition::unit(ids::RIDE_G1, "Vow Knight", 1, 8000)
            .with_skill(Skill::Boost)
            .with_skill(Skill::Drive)
            .with_shield(5000)
            .with_effect(
                EffectDefinition::triggered("ON_ATTACK_HIT", builtin::DRAW_CARD)
                    .optional()
                    .in_zone(Zone::Vanguard)
                    .when(Condition::leaf("energy", CompareOp::Ge, 3)),
            ),
    );
    db.register(
        CardDefinition::unit(ids::RIDE_G2, "Banner Captain", 2, 10000)
            .with_skill(Skill::Intercept)
            .with_skill(Skill::Drive)
            .with_shield(5000)
            .with_effect(EffectDefinition::triggered("ON_RIDE", builtin::DRAW_CARD).optional().in_zone(Zone::Soul)),
    );
    db.register(
        CardDefinition::unit(ids::RIDE_G3, "Sunrise Commander", 3, 13000)
            .with_skill(Skill::TwinDrive)
            .with_effect(EffectDefinition::triggered("ON_RIDE", builtin::ENERGY_CHARGE).in_zone(Zone::Vanguard))
            .with_effect(
                EffectDefinition::activated(builtin::VANGUARD_POWER)
                    .in_zone(Zone::Vanguard)
                    .with_cost(Cost::energy(3)),
            ),
    );

    // Triggers
    db.register(
        CardDefinition::unit(ids::HEAL, "Mending Angel", 0, 5000)
            .with_trigger(TriggerKind::Heal)
            .with_shield(20000),
    );
    db.register(
        CardDefinition::unit(ids::CRITICAL, "Keen Striker", 0, 5000)
            .with_trigger(TriggerKind::Critical)
            .with_shield(15000),
    );
    db.register(
        CardDefinition::unit(ids::DRAW, "Lore Scholar", 0, 5000)
            .with_trigger(TriggerKind::Draw)
            .with_shield(10000),
    );

    // Normal units
    db.register(CardDefinition::unit(ids::SENTINEL, "Aegis Warden", 1, 6000).with_skill(Skill::Sentinel));
    db.register(
        CardDefinition::unit(ids::SQUIRE, "Eager Squire", 1, 8000)
            .with_skill(Skill::Boost)
            .with_shield(5000)
            .with_effect(EffectDefinition::triggered("ON_CALL", builtin::SOUL_CHARGE).optional().in_zone(Zone::RearGuard)),
    );
    db.register(
        CardDefinition::unit(ids::LANCER, "Bastion Lancer", 2, 10000)
            .with_skill(Skill::Intercept)
            .with_shield(5000),
    );
    db.register(CardDefinition::unit(ids::CHAMPION, "Grand Champion", 3, 13000).with_skill(Skill::TwinDrive));

    db
}

/// Builds a mirror match between two trial decks.
#[derive(Clone, Debug)]
pub struct TrialMatchBuilder {
    rules: RulesConfig,
    effects: EffectRegistry,
    run_setup: bool,
}

impl Default for TrialMatchBuilder {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            effects: EffectRegistry::with_builtins(),
            run_setup: true,
        }
    }
}

impl TrialMatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom rules.
    #[must_use]
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Use a custom effect registry. It must hold the stock procedures.
    #[must_use]
    pub fn effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    /// Leave the match in `setup` instead of running it.
    #[must_use]
    pub fn without_setup(mut self) -> Self {
        self.run_setup = false;
        self
    }

    /// Build the engine and the opening state.
    pub fn build(self, seed: u64) -> Result<(Engine, GameState), EngineError> {
        let db = trial_database();
        let main = main_list();
        let mut alloc = EntityAllocator::new();

        let deck0 = db.build_deck(&RIDE_DECK, &main, &self.effects, &mut alloc)?;
        let deck1 = db.build_deck(&RIDE_DECK, &main, &self.effects, &mut alloc)?;

        let engine = Engine::new(self.rules, self.effects);
        let mut state = engine.new_match(deck0, deck1, seed);
        if self.run_setup {
            state = engine.try_apply(&state, &Action::Pass)?;
        }
        Ok((engine, state))
    }
}
