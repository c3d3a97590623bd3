//! Ready-made card pools and decks.
//!
//! - `trial`: a two-deck trial set that satisfies the standard deck
//!   composition, used by tests, benchmarks and demo drivers.

pub mod trial;
