//! Interactive choices made while resolving triggers.
//!
//! Some trigger resolutions need a decision that is not an action of its
//! own: which unit gets the +power, which unit gets +1 critical, which
//! damage card a heal removes. The applier asks a [`Chooser`] for these.
//! Every request carries at least one option.

use tracing::warn;

use crate::core::{EntityId, GameState, PlayerId};
use crate::zones::CircleName;

/// What is being chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceKind {
    /// Unit receiving a trigger's power bonus.
    PowerTarget,
    /// Unit receiving a critical trigger's +1 critical.
    CriticalTarget,
    /// Damage-zone card a heal trigger moves to the drop zone.
    HealTarget,
}

/// One selectable option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceOption {
    Circle(CircleName),
    Card(EntityId),
}

/// A request for a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceRequest {
    pub kind: ChoiceKind,
    /// The player deciding.
    pub player: PlayerId,
    /// Never empty.
    pub options: Vec<ChoiceOption>,
}

/// Supplies decisions for choice requests.
pub trait Chooser {
    /// Return an index into `request.options`.
    fn choose(&mut self, state: &GameState, request: &ChoiceRequest) -> usize;
}

/// Ask `chooser` and validate the answer. Out-of-range answers fall back
/// to the first option.
pub(crate) fn ask(chooser: &mut dyn Chooser, state: &GameState, request: &ChoiceRequest) -> ChoiceOption {
    let index = chooser.choose(state, request);
    match request.options.get(index) {
        Some(option) => *option,
        None => {
            warn!(index, count = request.options.len(), kind = ?request.kind, "choice out of range; using first option");
            request.options[0]
        }
    }
}

/// Deterministic choices with no input.
///
/// Power and critical go to the unit in the current battle (the attacker
/// for the attacking side, the attacked unit for the defending side) and
/// otherwise to the vanguard. Heal removes the oldest damage card.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultChooser;

impl DefaultChooser {
    fn battle_circle(state: &GameState, player: PlayerId) -> Option<CircleName> {
        let battle = state.battle?;
        if player == state.active {
            Some(battle.attacker)
        } else {
            Some(battle.target)
        }
    }
}

impl Chooser for DefaultChooser {
    fn choose(&mut self, state: &GameState, request: &ChoiceRequest) -> usize {
        match request.kind {
            ChoiceKind::PowerTarget | ChoiceKind::CriticalTarget => {
                let preferred = Self::battle_circle(state, request.player)
                    .into_iter()
                    .chain(std::iter::once(CircleName::V));
                for circle in preferred {
                    if let Some(i) = request
                        .options
                        .iter()
                        .position(|o| *o == ChoiceOption::Circle(circle))
                    {
                        return i;
                    }
                }
                0
            }
            ChoiceKind::HealTarget => 0,
        }
    }
}

/// Choices used inside search rollouts.
///
/// Same as [`DefaultChooser`] except a heal removes the most recently
/// taken damage card.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolloutChooser;

impl Chooser for RolloutChooser {
    fn choose(&mut self, state: &GameState, request: &ChoiceRequest) -> usize {
        match request.kind {
            ChoiceKind::HealTarget => request.options.len().saturating_sub(1),
            _ => DefaultChooser.choose(state, request),
        }
    }
}
