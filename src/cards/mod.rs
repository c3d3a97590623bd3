//! Card system: definitions, instances, and the card database.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardDefinition`: Printed card data (grade, power, skills, effects)
//! - `Card`: A card instance with a permanent `EntityId`
//! - `CardDatabase`: Definition lookup and deck construction

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{CardDefinition, CardId, Cost, EffectDefinition, Skill, TriggerKind};
pub use instance::Card;
pub use registry::{CardDatabase, Deck};
