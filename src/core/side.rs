//! Sides and per-side data storage.
//!
//! ## Side
//!
//! A match always has exactly two sides, `player1` and `player2`. Player 1
//! acts first.
//!
//! ## SideMap
//!
//! Fixed two-slot storage indexed by `Side`, used for energy pools,
//! turn-state, control progress and anything else kept per side.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// Both sides in turn order.
    pub const BOTH: [Side; 2] = [Side::Player1, Side::Player2];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    /// 0-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }

    /// Prefix used by character ids owned by this side (`P` or `E`).
    #[must_use]
    pub const fn id_prefix(self) -> char {
        match self {
            Side::Player1 => 'P',
            Side::Player2 => 'E',
        }
    }

    /// Wire name (`player1` / `player2`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Player1 => "player1",
            Side::Player2 => "player2",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-side storage with O(1) access.
///
/// ## Example
///
/// ```
/// use hex_tactics::core::{Side, SideMap};
///
/// let mut energy: SideMap<u32> = SideMap::with_value(0);
/// energy[Side::Player2] = 4;
/// assert_eq!(energy[Side::Player1], 0);
/// assert_eq!(energy[Side::Player2], 4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    pub player1: T,
    pub player2: T,
}

impl<T> SideMap<T> {
    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            player1: factory(Side::Player1),
            player2: factory(Side::Player2),
        }
    }

    /// Create with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            player1: value.clone(),
            player2: value,
        }
    }

    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    /// Iterate over (Side, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Player1, &self.player1), (Side::Player2, &self.player2)].into_iter()
    }

    /// Apply a function to both entries.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> SideMap<U> {
        SideMap {
            player1: f(&self.player1),
            player2: f(&self.player2),
        }
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}

/// Where a participant sits in a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Player1,
    Player2,
    Spectator,
}

impl Seat {
    /// The side this seat controls, if any.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Seat::Player1 => Some(Side::Player1),
            Seat::Player2 => Some(Side::Player2),
            Seat::Spectator => None,
        }
    }
}

impl From<Side> for Seat {
    fn from(side: Side) -> Self {
        match side {
            Side::Player1 => Seat::Player1,
            Side::Player2 => Seat::Player2,
        }
    }
}
