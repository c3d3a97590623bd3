//! Card definitions - static card data.
//!
//! `CardDefinition` holds what is printed on a card: grade, power,
//! shield, skills, trigger and effect definitions. Per-instance state
//! (resting, bonus power, visibility) lives on [`Card`](super::Card).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::EffectId;
use crate::triggers::Condition;
use crate::zones::Zone;

/// Unique identifier for a card definition.
///
/// Shared by every copy of the same card in a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Skill tags printed on a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Can boost the front-row unit in its column.
    Boost,
    /// Can move from the front row into the guardian zone.
    Intercept,
    /// One drive check.
    Drive,
    /// Two drive checks.
    TwinDrive,
    /// Three drive checks.
    TripleDrive,
    /// Perfect-guard style unit (counted by the determinizer).
    Sentinel,
}

/// Trigger icon printed on a trigger unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    Heal,
    Critical,
    Draw,
    Front,
}

/// Cost paid when an activated effect is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    /// Energy removed from the player's energy counter.
    #[serde(default)]
    pub energy: i64,
    /// Cards moved from the top of the soul to the drop zone.
    #[serde(default)]
    pub soul_blast: usize,
}

impl Cost {
    /// No cost.
    pub const FREE: Cost = Cost { energy: 0, soul_blast: 0 };

    /// An energy-only cost.
    #[must_use]
    pub const fn energy(amount: i64) -> Self {
        Self { energy: amount, soul_blast: 0 }
    }

    /// A soul-blast-only cost.
    #[must_use]
    pub const fn soul_blast(count: usize) -> Self {
        Self { energy: 0, soul_blast: count }
    }

    /// Check whether nothing needs to be paid.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.energy == 0 && self.soul_blast == 0
    }
}

/// An effect printed on a card.
///
/// Either triggered (fires when an event named `trigger` occurs) or
/// activatable (offered as an ACT action in the main phase).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    /// Event name this effect listens for (e.g. "ON_RIDE").
    /// Matched case- and separator-insensitively.
    pub trigger: String,

    /// The card must be in this zone for the effect to apply.
    #[serde(default)]
    pub zone: Option<Zone>,

    /// Gating condition; `None` means always.
    #[serde(default)]
    pub condition: Option<Condition>,

    /// Mandatory effects resolve automatically.
    #[serde(default)]
    pub mandatory: bool,

    /// Offered as an ACT action in the main phase.
    #[serde(default)]
    pub activatable: bool,

    /// Usable once per turn.
    #[serde(default)]
    pub once_per_turn: bool,

    /// Cost for activation.
    #[serde(default)]
    pub cost: Cost,

    /// Procedure to run from the effect registry.
    pub effect: EffectId,
}

impl EffectDefinition {
    /// A mandatory triggered effect.
    #[must_use]
    pub fn triggered(trigger: impl Into<String>, effect: EffectId) -> Self {
        Self {
            trigger: trigger.into(),
            zone: None,
            condition: None,
            mandatory: true,
            activatable: false,
            once_per_turn: false,
            cost: Cost::FREE,
            effect,
        }
    }

    /// An activatable (ACT) effect, once per turn by default.
    #[must_use]
    pub fn activated(effect: EffectId) -> Self {
        Self {
            trigger: "ACT".to_string(),
            zone: None,
            condition: None,
            mandatory: false,
            activatable: true,
            once_per_turn: true,
            cost: Cost::FREE,
            effect,
        }
    }

    /// Make the effect optional (the player chooses whether to resolve it).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Restrict the effect to a zone.
    #[must_use]
    pub fn in_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Gate the effect on a condition.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the activation cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }

    /// Allow repeated activation within a turn.
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.once_per_turn = false;
        self
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use vanguard_sim::cards::{CardDefinition, CardId, Skill};
///
/// let knight = CardDefinition::unit(CardId::new(1), "Knight of Silence", 1, 8000)
///     .with_skill(Skill::Boost)
///     .with_shield(5000);
///
/// assert_eq!(knight.grade, Some(1));
/// assert_eq!(knight.drive(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name.
    pub name: String,

    /// Grade; `None` for non-unit cards.
    #[serde(default)]
    pub grade: Option<u8>,

    /// Base power; `None` for non-unit cards.
    #[serde(default)]
    pub power: Option<i64>,

    /// Base critical.
    #[serde(default = "default_critical")]
    pub critical: i64,

    /// Shield value when used as a guardian; `None` if it cannot guard.
    #[serde(default)]
    pub shield: Option<i64>,

    /// Skill tags.
    #[serde(default)]
    pub skills: SmallVec<[Skill; 4]>,

    /// Trigger icon.
    #[serde(default)]
    pub trigger: Option<TriggerKind>,

    /// Printed effects, addressed by index.
    #[serde(default)]
    pub effects: Vec<EffectDefinition>,
}

fn default_critical() -> i64 {
    1
}

impl CardDefinition {
    /// Create a non-unit card (order, crest, ...).
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            grade: None,
            power: None,
            critical: 1,
            shield: None,
            skills: SmallVec::new(),
            trigger: None,
            effects: Vec::new(),
        }
    }

    /// Create a unit with a grade and base power. Shield defaults to 0.
    #[must_use]
    pub fn unit(id: CardId, name: impl Into<String>, grade: u8, power: i64) -> Self {
        Self {
            grade: Some(grade),
            power: Some(power),
            shield: Some(0),
            ..Self::new(id, name)
        }
    }

    /// Add a skill tag.
    #[must_use]
    pub fn with_skill(mut self, skill: Skill) -> Self {
        if !self.skills.contains(&skill) {
            self.skills.push(skill);
        }
        self
    }

    /// Set the shield value.
    #[must_use]
    pub fn with_shield(mut self, shield: i64) -> Self {
        self.shield = Some(shield);
        self
    }

    /// Set the base critical.
    #[must_use]
    pub fn with_critical(mut self, critical: i64) -> Self {
        self.critical = critical;
        self
    }

    /// Set the trigger icon.
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Append an effect definition.
    #[must_use]
    pub fn with_effect(mut self, effect: EffectDefinition) -> Self {
        self.effects.push(effect);
        self
    }

    /// Check for a skill tag.
    #[must_use]
    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Is this a unit (has power)?
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.power.is_some()
    }

    /// Number of drive checks this card performs as an attacking vanguard.
    ///
    /// Always 0 for non-units.
    #[must_use]
    pub fn drive(&self) -> usize {
        if self.power.is_none() {
            return 0;
        }
        if self.has_skill(Skill::TripleDrive) {
            3
        } else if self.has_skill(Skill::TwinDrive) {
            2
        } else if self.has_skill(Skill::Drive) {
            1
        } else {
            0
        }
    }
}
