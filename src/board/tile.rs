//! Tile identifiers.
//!
//! Tiles are named by row letter and 1-based column (`A1`, `E8`, `I4`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::ParseIdError;

/// Identifier of a board tile.
///
/// Ordering is row-major, which is also the order [`Board::tiles`](super::Board::tiles)
/// yields them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileId {
    row: u8,
    col: u8,
}

impl TileId {
    /// Create from 0-based row and column. Does not check the board layout.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 0-based row (`A` = 0).
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// 0-based column.
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    #[must_use]
    pub const fn row_letter(self) -> char {
        (b'A' + self.row) as char
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col + 1)
    }
}

impl FromStr for TileId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseIdError(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().filter(char::is_ascii_uppercase).ok_or_else(bad)?;
        let col: u8 = chars.as_str().parse().map_err(|_| bad())?;
        let col = col.checked_sub(1).ok_or_else(bad)?;
        Ok(TileId::new(letter as u8 - b'A', col))
    }
}

impl TryFrom<String> for TileId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TileId> for String {
    fn from(id: TileId) -> Self {
        id.to_string()
    }
}
