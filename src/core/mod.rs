//! Core match types: sides, ids, state, requests, RNG, configuration.
//!
//! Everything here is transport-agnostic. Hosts configure a match through
//! `MatchConfig` rather than modifying the core.

pub mod action;
pub mod config;
pub mod entity;
pub mod rng;
pub mod side;
pub mod state;

pub use action::{CardKind, ReplayLog, Request, RequestRecord};
pub use config::{
    AbilityDef, ConfigError, ConfigResult, CostTable, HeroDef, Kit, MatchConfig, RosterError, RosterTable,
    RuleConstants, Traits,
};
pub use entity::{Archetype, CharacterId, ParseIdError, ParticipantId, Role, RoomId, SLOTS_PER_SIDE};
pub use rng::{GameRng, RandomSource, ScriptedDice};
pub use side::{Seat, Side, SideMap};
pub use state::{Character, MatchMode, MatchState, Token, TurnState};
