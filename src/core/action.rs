//! Inbound requests and the replay log.
//!
//! A `Request` is everything a participant can ask of a match. Requests are
//! plain data: the engine validates and applies them, and every accepted
//! one is appended to the match's [`ReplayLog`] as a [`RequestRecord`].
//!
//! ## Wire form
//!
//! Requests are externally tagged with camelCase names and fields:
//!
//! ```
//! use hex_tactics::core::Request;
//!
//! let req: Request = serde_json::from_str(r#"{"move":{"id":"P1","toTile":"H1"}}"#).unwrap();
//! assert!(matches!(req, Request::Move { .. }));
//!
//! let end: Request = serde_json::from_str(r#""endTurn""#).unwrap();
//! assert_eq!(end, Request::EndTurn);
//! ```

use serde::{Deserialize, Serialize};

use crate::board::TileId;

use super::entity::{CharacterId, ParticipantId, RoomId};
use super::state::MatchMode;

/// A resource card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    Fireball,
    Entangle,
    Cleanse,
    IronSkin,
    InvisibilityPotion,
    Scope,
    Siphon,
    Sprint,
    SideStep,
    Dash,
    Blink,
    Wall,
    Shatter,
    BlossomWall,
    Teleport,
}

impl CardKind {
    /// Key into the cost table.
    #[must_use]
    pub const fn cost_key(self) -> &'static str {
        match self {
            CardKind::BlossomWall => "HealingPetal",
            other => other.wire_name(),
        }
    }

    /// Name as sent in `cardPlayed` / `cardRevealed`.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            CardKind::Fireball => "Fireball",
            CardKind::Entangle => "Entangle",
            CardKind::Cleanse => "Cleanse",
            CardKind::IronSkin => "IronSkin",
            CardKind::InvisibilityPotion => "InvisibilityPotion",
            CardKind::Scope => "Scope",
            CardKind::Siphon => "Siphon",
            CardKind::Sprint => "Sprint",
            CardKind::SideStep => "SideStep",
            CardKind::Dash => "Dash",
            CardKind::Blink => "Blink",
            CardKind::Wall => "Wall",
            CardKind::Shatter => "Shatter",
            CardKind::BlossomWall => "BlossomWall",
            CardKind::Teleport => "Teleport",
        }
    }

    /// Name recorded as the side's last discard.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            CardKind::SideStep => "Side Step",
            CardKind::InvisibilityPotion => "Invisibility Potion",
            CardKind::IronSkin => "Iron Skin",
            CardKind::BlossomWall => "Blossom Wall",
            other => other.wire_name(),
        }
    }
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A participant's request to a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    /// Enter a room, optionally with hero picks in slot order (Tank, DPS, DPS, Support).
    #[serde(rename_all = "camelCase")]
    Join {
        room: RoomId,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        heroes: Vec<String>,
        #[serde(default)]
        mode: Option<MatchMode>,
    },

    #[serde(rename_all = "camelCase")]
    Move { id: CharacterId, to_tile: TileId },

    #[serde(rename_all = "camelCase")]
    UsePrimary { source_id: CharacterId, target_id: Option<CharacterId> },

    #[serde(rename_all = "camelCase")]
    UseSpecial {
        source_id: CharacterId,
        #[serde(default)]
        target_id: Option<CharacterId>,
        #[serde(default)]
        center_tile: Option<TileId>,
    },

    #[serde(rename_all = "camelCase")]
    PlayCard {
        #[serde(rename = "type")]
        card: CardKind,
        #[serde(default)]
        tile: Option<TileId>,
        #[serde(default)]
        source_id: Option<CharacterId>,
        #[serde(default)]
        to_tile: Option<TileId>,
        #[serde(default)]
        target_id: Option<CharacterId>,
    },

    RevealCard {
        #[serde(rename = "type")]
        card: CardKind,
    },

    EndTurn,
}

impl Request {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Request::Join { .. } => "join",
            Request::Move { .. } => "move",
            Request::UsePrimary { .. } => "usePrimary",
            Request::UseSpecial { .. } => "useSpecial",
            Request::PlayCard { .. } => "playCard",
            Request::RevealCard { .. } => "revealCard",
            Request::EndTurn => "endTurn",
        }
    }

    /// Bare card play with no optional fields.
    #[must_use]
    pub fn card(card: CardKind) -> Self {
        Request::PlayCard { card, tile: None, source_id: None, to_tile: None, target_id: None }
    }
}

/// An accepted request with its position in match history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub from: ParticipantId,
    pub request: Request,
    /// Match round when the request was accepted.
    pub round: u32,
    /// Position in the log.
    pub sequence: u32,
}

impl RequestRecord {
    #[must_use]
    pub fn new(from: ParticipantId, request: Request, round: u32, sequence: u32) -> Self {
        Self { from, request, round, sequence }
    }
}

/// Accepted requests of one match, in order, with the seed that reproduces it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub seed: u64,
    pub records: Vec<RequestRecord>,
}

impl ReplayLog {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, records: Vec::new() }
    }

    /// Append a record, numbering it.
    pub fn push(&mut self, from: ParticipantId, request: Request, round: u32) {
        let sequence = self.records.len() as u32;
        self.records.push(RequestRecord::new(from, request, round, sequence));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }
}
