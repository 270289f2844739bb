//! Error types.
//!
//! `ActionError` is the reason a request was refused. Refusals never mutate
//! match state; [`ActionError::kind`] tells the caller how to report them.

use thiserror::Error;

use crate::board::TileId;
use crate::core::{CharacterId, RoomId};

/// How a refusal is surfaced to the requester.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rule violation; moves get an `invalidMove` reply.
    Rejected,
    /// Not enough energy; the requester gets `insufficientEnergy`.
    Shortfall,
    /// The client acted on an out-of-date view; ignored silently.
    Stale,
}

/// Why a request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("match is over")]
    MatchOver,

    #[error("participant holds no seat")]
    NotSeated,

    #[error("not your turn")]
    NotYourTurn,

    #[error("{0} belongs to the other side")]
    NotOwner(CharacterId),

    #[error("{0} is not on the board")]
    NotOnBoard(CharacterId),

    #[error("unknown tile {0}")]
    UnknownTile(TileId),

    #[error("rooted")]
    Rooted,

    #[error("already moved this turn")]
    AlreadyMoved,

    #[error("already acted this turn")]
    AlreadyActed,

    #[error("a card was already played this turn")]
    CardAlreadyPlayed,

    #[error("tile {0} is occupied")]
    Occupied(TileId),

    #[error("tile {0} is walled")]
    Walled(TileId),

    #[error("no path")]
    Unreachable,

    #[error("out of range: distance {distance}, limit {limit}")]
    OutOfRange { distance: u32, limit: u32 },

    #[error("path of {distance} is shorter than the required {min}")]
    TooShort { distance: u32, min: u32 },

    #[error("invalid target: {0}")]
    InvalidTarget(&'static str),

    #[error("target is invisible")]
    Invisible,

    #[error("special is on cooldown for {0} more turns")]
    OnCooldown(u32),

    #[error("requirement not met: {0}")]
    Requirement(&'static str),

    #[error("insufficient energy for {card}: have {have}, need {required}")]
    InsufficientEnergy { card: String, have: u32, required: u32 },

    #[error("no wall on {0}")]
    NoWall(TileId),
}

impl ActionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::NotOnBoard(_) => ErrorKind::Stale,
            ActionError::InsufficientEnergy { .. } => ErrorKind::Shortfall,
            _ => ErrorKind::Rejected,
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Errors from the match registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry lock poisoned")]
    LockPoisoned,

    #[error("no match in room {0}")]
    MatchNotFound(RoomId),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
