//! Recoverable engine errors.
//!
//! No error in this crate is fatal. The applier reports them and hands
//! back the input state unchanged so the driver can pick another action.

use thiserror::Error;

use super::entity::EntityId;
use super::state::Phase;
use crate::cards::CardId;
use crate::effects::EffectId;

/// Errors reported by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A circle name that is not one of V, R1..R5.
    #[error("unknown circle name: {0}")]
    UnknownCircle(String),

    /// A card was expected in a zone or circle but is not there.
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// The cost of an activated effect cannot be paid.
    #[error("cannot pay cost for {card}: {reason}")]
    UnaffordableCost { card: EntityId, reason: String },

    /// ACTIVATE_EFFECT referenced an effect no longer pending.
    #[error("no pending optional effect {effect_index} from {source_card}")]
    UnmatchedEffect { source_card: CardId, effect_index: usize },

    /// A condition expression with an unrecognized shape or field.
    #[error("malformed condition: {0}")]
    MalformedCondition(String),

    /// The action does not apply in the current phase.
    #[error("action {action} is not handled in phase {phase:?}")]
    UnhandledAction { action: String, phase: Phase },

    /// The action is well formed but breaks a rule.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// A card references an effect procedure nobody registered.
    #[error("unknown effect {0}")]
    UnknownEffect(EffectId),

    /// An unknown card definition id during deck construction.
    #[error("unknown card definition {0}")]
    UnknownCard(CardId),

    /// The match already has a winner.
    #[error("game is over")]
    GameOver,
}

impl EngineError {
    /// Shorthand for a `CardNotFound` with a formatted description.
    pub fn card_not_found(what: impl Into<String>) -> Self {
        Self::CardNotFound(what.into())
    }

    /// Shorthand for an `IllegalAction` with a formatted description.
    pub fn illegal(what: impl Into<String>) -> Self {
        Self::IllegalAction(what.into())
    }
}
