//! Trial deck: a small, complete card pool and a mirror-match builder.
//!
//! Every main deck built here holds exactly the standard composition
//! (16 triggers, 4 of them heals, and 4 sentinels), so the determinizer's
//! totals hold for it without configuration.
//!
//! ```
//! use vanguard_sim::core::Phase;
//! use vanguard_sim::games::trial::TrialMatchBuilder;
//!
//! let (engine, state) = TrialMatchBuilder::new().build(7).unwrap();
//! assert_eq!(state.phase, Phase::Mulligan);
//! assert_eq!(state.players[0].hand.len(), engine.config().starting_hand_size);
//! ```

mod deck;

pub use deck::{ids, trial_database, TrialMatchBuilder, MAIN_DECK, RIDE_DECK};
