//! Effect registry - named procedures addressed by `EffectId`.
//!
//! Card definitions say WHICH procedure runs (`EffectDefinition::effect`);
//! the registry says WHAT it does. Deck construction checks every id a
//! deck references against the registry, so the applier only ever meets
//! ids that resolve.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EntityId, GameState, PlayerId};
use crate::triggers::EventPayload;

/// Stable identifier of an effect procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID.
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

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// What a procedure knows about why it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectContext {
    /// Controller of the source card.
    pub player: PlayerId,
    /// Card carrying the effect.
    pub source: EntityId,
    /// Payload of the triggering event (`None` for ACT).
    pub payload: EventPayload,
}

/// An effect procedure. Mutates the (already cloned) state in place.
pub type EffectFn = Arc<dyn Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync>;

#[derive(Clone)]
struct Procedure {
    name: String,
    run: EffectFn,
}

/// Table of effect procedures.
///
/// ## Example
///
/// ```
/// use vanguard_sim::effects::{EffectId, EffectRegistry};
///
/// let mut registry = EffectRegistry::new();
/// registry.register(EffectId::new(100), "gain energy", |state, ctx| {
///     state.player_mut(ctx.player).energy += 1;
///     Ok(())
/// });
///
/// assert!(registry.contains(EffectId::new(100)));
/// assert_eq!(registry.name(EffectId::new(100)), Some("gain energy"));
/// ```
#[derive(Clone, Default)]
pub struct EffectRegistry {
    procedures: FxHashMap<EffectId, Procedure>,
}

impl EffectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure, replacing any previous one with the same id.
    pub fn register<F>(&mut self, id: EffectId, name: impl Into<String>, run: F)
    where
        F: Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync + 'static,
    {
        let run: EffectFn = Arc::new(run);
        self.procedures.insert(id, Procedure { name: name.into(), run });
    }

    /// Register a procedure (builder pattern).
    #[must_use]
    pub fn with<F>(mut self, id: EffectId, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut GameState, &EffectContext) -> Result<(), EngineError> + Send + Sync + 'static,
    {
        self.register(id, name, run);
        self
    }

    #[must_use]
    pub fn contains(&self, id: EffectId) -> bool {
        self.procedures.contains_key(&id)
    }

    #[must_use]
    pub fn name(&self, id: EffectId) -> Option<&str> {
        self.procedures.get(&id).map(|p| p.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Run a procedure against `state`.
    pub fn invoke(
        &self,
        id: EffectId,
        state: &mut GameState,
        ctx: &EffectContext,
    ) -> Result<(), EngineError> {
        let procedure = self.procedures.get(&id).ok_or(EngineError::UnknownEffect(id))?;
        (procedure.run)(state, ctx)
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .procedures
            .iter()
            .map(|(id, p)| (id.raw(), p.name.as_str()))
            .collect();
        names.sort_unstable();
        f.debug_struct("EffectRegistry").field("procedures", &names).finish()
    }
}
