//! # hex-tactics
//!
//! Authoritative match engine for a two-player, turn-based tactics game on a
//! 9×9 hex board. Each side fields four characters (Tank, two DPS, Support);
//! a match is won by eliminating the other side or, in control mode, by
//! winning rounds on a central control point.
//!
//! ## Design Principles
//!
//! 1. **Draft, then commit**: every request runs against a clone of the
//!    match state. The clone replaces the live state only if the handler
//!    succeeds, so refused requests never leave partial changes.
//!
//! 2. **Persistent data**: state lives in `im` maps and vectors, making the
//!    draft clone O(1) and iteration order deterministic.
//!
//! 3. **No I/O in the core**: handlers push notifications into an outbox;
//!    the host decides how to deliver them.
//!
//! 4. **Deterministic randomness**: seat flips, backgrounds and dice come
//!    from a seeded [`RandomSource`], so a match can be replayed from its
//!    request log.
//!
//! ## Modules
//!
//! - `board`: tile ids, hex geometry, adjacency and path distances
//! - `core`: ids, sides, configuration, RNG, requests and match state
//! - `effects`: ability effects, targeting and their resolution
//! - `status`: per-character status slots and turn-boundary ticks
//! - `energy`: per-side energy pools and round income
//! - `control`: control-point scoring, round flips and respawns
//! - `rules`: movement, abilities, cards, turn flow and the [`Match`] engine
//! - `events`: outbound notifications and full-state snapshots
//! - `registry`: one match per room, with broadcast channels

pub mod board;
pub mod control;
pub mod core;
pub mod effects;
pub mod energy;
pub mod error;
pub mod events;
pub mod registry;
pub mod rules;
pub mod status;

pub use crate::board::{Board, BoardLayout, TileId};

pub use crate::core::{
    CardKind, CharacterId, GameRng, MatchConfig, MatchMode, MatchState, ParticipantId, RandomSource, ReplayLog,
    Request, Role, RoomId, ScriptedDice, Seat, Side, SideMap,
};

pub use crate::error::{ActionError, ActionResult, ErrorKind, RegistryError, RegistryResult};

pub use crate::events::{Audience, Envelope, FullState, Notification, Outbox};

pub use crate::registry::MatchRegistry;

pub use crate::rules::Match;
