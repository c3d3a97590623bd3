//! Events, pending effects and the conditions that gate them.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: A queued event with its lazily collected pending effects
//! - [`EventKind`]: What happened (`ON_RIDE`, `ON_CALL`, ...)
//! - [`Condition`]: Typed gating expression and its JSON decoding
//! - [`collect_pending_effects`]: Matches card effects against an event
//!
//! ## Example Usage
//!
//! ```
//! use vanguard_sim::core::PlayerId;
//! use vanguard_sim::triggers::{ConditionContext, ConditionEvaluator, CompareOp, Condition, EventKind, GameEvent};
//!
//! let event = GameEvent::new(EventKind::Call, PlayerId::new(0));
//! assert!(event.pending.is_none());
//!
//! let ctx = ConditionContext { active_player: 0, energy: 3 };
//! let cond = Condition::leaf("energy", CompareOp::Ge, 2);
//! assert!(ConditionEvaluator::evaluate(&cond, &ctx));
//! ```

mod condition;
mod event;
mod pending;

pub use condition::{CompareOp, Condition, ConditionContext, ConditionEvaluator};
pub use event::{normalize_trigger, EventKind, EventPayload, GameEvent, PendingEffect};
pub use pending::collect_pending_effects;
