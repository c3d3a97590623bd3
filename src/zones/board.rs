//! Circles and the board.
//!
//! ```text
//!   front:  R1   V   R2
//!   back:   R3   R4  R5
//! ```
//!
//! Columns pair a front circle with the back circle behind it:
//! (R1, R3), (V, R4), (R2, R5). The back unit of a column is the only
//! one that can boost the front unit.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::{EngineError, EntityId};

/// Name of one of the six circles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CircleName {
    V,
    R1,
    R2,
    R3,
    R4,
    R5,
}

/// Front or back row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Row {
    Front,
    Back,
}

impl CircleName {
    /// All circles in board order.
    pub const ALL: [CircleName; 6] = [
        CircleName::V,
        CircleName::R1,
        CircleName::R2,
        CircleName::R3,
        CircleName::R4,
        CircleName::R5,
    ];

    /// Front row circles.
    pub const FRONT: [CircleName; 3] = [CircleName::V, CircleName::R1, CircleName::R2];

    /// Back row circles.
    pub const BACK: [CircleName; 3] = [CircleName::R3, CircleName::R4, CircleName::R5];

    /// Rear-guard circles (everything but V).
    pub const REAR: [CircleName; 5] = [
        CircleName::R1,
        CircleName::R2,
        CircleName::R3,
        CircleName::R4,
        CircleName::R5,
    ];

    #[must_use]
    pub fn row(self) -> Row {
        match self {
            CircleName::V | CircleName::R1 | CircleName::R2 => Row::Front,
            CircleName::R3 | CircleName::R4 | CircleName::R5 => Row::Back,
        }
    }

    /// The other circle in this circle's column.
    #[must_use]
    pub fn column_partner(self) -> CircleName {
        match self {
            CircleName::V => CircleName::R4,
            CircleName::R4 => CircleName::V,
            CircleName::R1 => CircleName::R3,
            CircleName::R3 => CircleName::R1,
            CircleName::R2 => CircleName::R5,
            CircleName::R5 => CircleName::R2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CircleName::V => "V",
            CircleName::R1 => "R1",
            CircleName::R2 => "R2",
            CircleName::R3 => "R3",
            CircleName::R4 => "R4",
            CircleName::R5 => "R5",
        }
    }
}

impl FromStr for CircleName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V" | "VC" => Ok(CircleName::V),
            "R1" => Ok(CircleName::R1),
            "R2" => Ok(CircleName::R2),
            "R3" => Ok(CircleName::R3),
            "R4" => Ok(CircleName::R4),
            "R5" => Ok(CircleName::R5),
            _ => Err(EngineError::UnknownCircle(s.to_string())),
        }
    }
}

impl std::fmt::Display for CircleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A circle and the unit on it, if any.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub name: CircleName,
    pub unit: Option<Card>,
}

impl Circle {
    #[must_use]
    pub fn new(name: CircleName) -> Self {
        Self { name, unit: None }
    }

    #[must_use]
    pub fn row(&self) -> Row {
        self.name.row()
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.unit.is_some()
    }
}

/// Six circles, indexed by `CircleName`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    circles: [Circle; 6],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            circles: CircleName::ALL.map(Circle::new),
        }
    }

    fn slot(name: CircleName) -> usize {
        name as usize
    }

    #[must_use]
    pub fn circle(&self, name: CircleName) -> &Circle {
        &self.circles[Self::slot(name)]
    }

    pub fn circle_mut(&mut self, name: CircleName) -> &mut Circle {
        &mut self.circles[Self::slot(name)]
    }

    /// Look up a circle by its textual name. Unknown names are an error.
    pub fn by_name(&self, name: &str) -> Result<&Circle, EngineError> {
        let name: CircleName = name.parse()?;
        Ok(self.circle(name))
    }

    /// Unit on a circle.
    #[must_use]
    pub fn unit(&self, name: CircleName) -> Option<&Card> {
        self.circle(name).unit.as_ref()
    }

    pub fn unit_mut(&mut self, name: CircleName) -> Option<&mut Card> {
        self.circle_mut(name).unit.as_mut()
    }

    /// The vanguard.
    #[must_use]
    pub fn vanguard(&self) -> Option<&Card> {
        self.unit(CircleName::V)
    }

    /// Place a unit, returning the previous occupant.
    pub fn place(&mut self, name: CircleName, card: Card) -> Option<Card> {
        self.circle_mut(name).unit.replace(card)
    }

    /// Remove and return the unit on a circle.
    pub fn remove(&mut self, name: CircleName) -> Option<Card> {
        self.circle_mut(name).unit.take()
    }

    /// Swap the units of two circles.
    pub fn swap(&mut self, a: CircleName, b: CircleName) {
        let ua = self.remove(a);
        let ub = self.remove(b);
        self.circle_mut(a).unit = ub;
        self.circle_mut(b).unit = ua;
    }

    /// All circles in board order.
    pub fn circles(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter()
    }

    /// Front-row circles.
    pub fn front_row(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| c.row() == Row::Front)
    }

    /// Back-row circles.
    pub fn back_row(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| c.row() == Row::Back)
    }

    /// Occupied circles with their units.
    pub fn units(&self) -> impl Iterator<Item = (CircleName, &Card)> {
        self.circles
            .iter()
            .filter_map(|c| c.unit.as_ref().map(|u| (c.name, u)))
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.circles.iter_mut().filter_map(|c| c.unit.as_mut())
    }

    /// Find the circle holding a card instance.
    #[must_use]
    pub fn find(&self, uid: EntityId) -> Option<CircleName> {
        self.units().find(|(_, u)| u.uid == uid).map(|(name, _)| name)
    }
}
