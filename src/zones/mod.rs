//! Zones and the board.
//!
//! The board is a fixed set of six circles; every other zone is an
//! ordered pile on [`PlayerState`](crate::core::PlayerState). `Zone`
//! names them all so effect definitions can restrict themselves to one.

mod board;

pub use board::{Board, Circle, CircleName, Row};

use serde::{Deserialize, Serialize};

/// Every place a card can be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    RideDeck,
    Hand,
    Drop,
    Damage,
    Soul,
    GZone,
    Bind,
    Guardian,
    Trigger,
    Crest,
    Order,
    /// On circle V.
    Vanguard,
    /// On any rear-guard circle.
    RearGuard,
}

impl Zone {
    /// Zone of a unit standing on the given circle.
    #[must_use]
    pub fn of_circle(circle: CircleName) -> Self {
        if circle == CircleName::V {
            Zone::Vanguard
        } else {
            Zone::RearGuard
        }
    }
}
