//! Identifiers for the things a match tracks.
//!
//! ## Character IDs
//!
//! Every side fields four characters in fixed slots. IDs render as the
//! side prefix plus a 1-based slot number:
//! - `P1..P4`: player 1 (Tank, DPS1, DPS2, Support)
//! - `E1..E4`: player 2 (Tank, DPS1, DPS2, Support)
//!
//! ```
//! use hex_tactics::core::{CharacterId, Role, Side};
//!
//! let id: CharacterId = "E3".parse().unwrap();
//! assert_eq!(id.side(), Side::Player2);
//! assert_eq!(id.role(), Role::Dps2);
//! assert_eq!(id.to_string(), "E3");
//! ```
//!
//! ## Participants and rooms
//!
//! Transport-level identities are opaque strings owned by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::side::Side;

/// Number of characters each side fields.
pub const SLOTS_PER_SIDE: u8 = 4;

/// Identifier of a character (and of its token while alive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacterId {
    side: Side,
    slot: u8,
}

impl CharacterId {
    /// Create an ID; `slot` is 0-based and must be below [`SLOTS_PER_SIDE`].
    #[must_use]
    pub const fn new(side: Side, slot: u8) -> Option<Self> {
        if slot < SLOTS_PER_SIDE {
            Some(Self { side, slot })
        } else {
            None
        }
    }

    /// Owning side.
    #[must_use]
    pub const fn side(self) -> Side {
        self.side
    }

    /// 0-based slot.
    #[must_use]
    pub const fn slot(self) -> u8 {
        self.slot
    }

    /// Role implied by the slot.
    #[must_use]
    pub const fn role(self) -> Role {
        match self.slot {
            0 => Role::Tank,
            1 => Role::Dps1,
            2 => Role::Dps2,
            _ => Role::Support,
        }
    }

    /// All eight character IDs, player 1 first.
    pub fn all() -> impl Iterator<Item = CharacterId> {
        Side::BOTH.into_iter().flat_map(Self::of_side)
    }

    /// The four character IDs of one side.
    pub fn of_side(side: Side) -> impl Iterator<Item = CharacterId> {
        (0..SLOTS_PER_SIDE).map(move |slot| CharacterId { side, slot })
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side.id_prefix(), self.slot + 1)
    }
}

/// Error parsing a character or tile identifier.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0:?}")]
pub struct ParseIdError(pub String);

impl FromStr for CharacterId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let side = match chars.next() {
            Some('P') => Side::Player1,
            Some('E') => Side::Player2,
            _ => return Err(ParseIdError(s.to_string())),
        };
        let n: u8 = chars.as_str().parse().map_err(|_| ParseIdError(s.to_string()))?;
        n.checked_sub(1)
            .and_then(|slot| CharacterId::new(side, slot))
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

impl TryFrom<String> for CharacterId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CharacterId> for String {
    fn from(id: CharacterId) -> Self {
        id.to_string()
    }
}

/// Slot role. Determines the class kit when no hero overrides it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Tank,
    #[serde(rename = "DPS1")]
    Dps1,
    #[serde(rename = "DPS2")]
    Dps2,
    Support,
}

impl Role {
    /// Hero archetype that may fill this role.
    #[must_use]
    pub const fn archetype(self) -> Archetype {
        match self {
            Role::Tank => Archetype::Tank,
            Role::Dps1 | Role::Dps2 => Archetype::Dps,
            Role::Support => Archetype::Support,
        }
    }
}

/// Hero archetype as listed in the hero catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Tank,
    #[serde(rename = "DPS")]
    Dps,
    Support,
}

/// Opaque transport identity of a connected participant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room identifier; one match per room.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_roundtrip_display() {
        for id in CharacterId::all() {
            let parsed: CharacterId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_character_id_rejects_garbage() {
        assert!("P0".parse::<CharacterId>().is_err());
        assert!("P5".parse::<CharacterId>().is_err());
        assert!("X1".parse::<CharacterId>().is_err());
        assert!("".parse::<CharacterId>().is_err());
    }

    #[test]
    fn test_character_id_roles() {
        let roles: Vec<_> = CharacterId::of_side(Side::Player1).map(CharacterId::role).collect();
        assert_eq!(roles, vec![Role::Tank, Role::Dps1, Role::Dps2, Role::Support]);
    }

    #[test]
    fn test_character_id_serde_as_string() {
        let id: CharacterId = "P4".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P4\"");
        assert_eq!(serde_json::to_string(&Role::Dps1).unwrap(), "\"DPS1\"");
    }

    #[test]
    fn test_ordering_puts_player1_first() {
        let ids: Vec<_> = CharacterId::all().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids[0].to_string(), "P1");
        assert_eq!(ids[7].to_string(), "E4");
    }
}
