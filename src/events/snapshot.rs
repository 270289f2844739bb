//! Full-state snapshot sent after every accepted request and on join.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::TileId;
use crate::control::ControlState;
use crate::core::{CharacterId, MatchMode, MatchState, Role, Side, SideMap};
use crate::status::StatusBucket;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub owner: Side,
    pub tile: TileId,
    pub has_moved_ever: bool,
    pub role: Role,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub special: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub role: Role,
    pub owner: Side,
    pub hp: i32,
    pub max_hp: i32,
    pub cds: Cooldowns,
    pub dead: bool,
    pub name: String,
    pub hero: Option<String>,
}

/// Turn flags of the side to act.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    pub card_played: bool,
    pub used_movement: bool,
    pub used_action: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallView {
    pub tile: TileId,
    pub ttl: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerView {
    pub tile: TileId,
    pub owner: Side,
    pub ttl: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraView {
    pub owner: Side,
    pub center: TileId,
    pub tiles: Vec<TileId>,
    pub remaining: u32,
}

/// Everything a client needs to redraw the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullState {
    pub background_url: Option<String>,
    pub mode: MatchMode,
    pub control: Option<ControlState>,
    pub blocked: Vec<WallView>,
    pub blossom_blocked: Vec<LayerView>,
    pub blossom_pink_blocked: Vec<LayerView>,
    pub auras: Vec<AuraView>,
    pub tokens: BTreeMap<CharacterId, TokenView>,
    pub chars: BTreeMap<CharacterId, CharacterView>,
    pub current_turn: Side,
    pub player_names: SideMap<Option<String>>,
    pub turn: TurnView,
    pub last_discard: SideMap<Option<String>>,
    pub energy: SideMap<u32>,
    pub energy_max: u32,
    pub fx: BTreeMap<CharacterId, StatusBucket>,
    pub round: u32,
    pub winner: Option<Side>,
}

fn layers(map: &im::OrdMap<TileId, crate::core::state::AuraLayers>) -> Vec<LayerView> {
    map.iter()
        .flat_map(|(tile, layers)| {
            layers
                .iter()
                .filter(|(_, ttl)| **ttl > 0)
                .map(|(owner, ttl)| LayerView { tile: *tile, owner, ttl: *ttl })
                .collect::<Vec<_>>()
        })
        .collect()
}

impl FullState {
    /// Capture the current state.
    #[must_use]
    pub fn capture(state: &MatchState) -> Self {
        let tokens = state
            .tokens
            .iter()
            .filter_map(|(id, tok)| {
                let c = state.character(*id)?;
                Some((
                    *id,
                    TokenView {
                        owner: tok.owner,
                        tile: tok.tile,
                        has_moved_ever: tok.has_moved_ever,
                        role: c.role,
                        name: c.name.clone(),
                    },
                ))
            })
            .collect();

        let chars = state
            .characters
            .iter()
            .map(|(id, c)| {
                (
                    *id,
                    CharacterView {
                        role: c.role,
                        owner: c.owner,
                        hp: c.hp,
                        max_hp: c.max_hp,
                        cds: Cooldowns { special: c.special_cooldown },
                        dead: c.dead,
                        name: c.name.clone(),
                        hero: c.hero.clone(),
                    },
                )
            })
            .collect();

        let fx = state
            .characters
            .iter()
            .filter(|(_, c)| !c.status.is_empty())
            .map(|(id, c)| (*id, c.status.clone()))
            .collect();

        let ts = &state.turn[state.current];

        Self {
            background_url: state.background.clone(),
            mode: state.mode,
            control: state.control.clone(),
            blocked: state.walls.iter().map(|(tile, ttl)| WallView { tile: *tile, ttl: *ttl }).collect(),
            blossom_blocked: layers(&state.aura_walls),
            blossom_pink_blocked: layers(&state.aura_rings),
            auras: state
                .heal_auras
                .iter()
                .map(|a| AuraView {
                    owner: a.owner,
                    center: a.center,
                    tiles: a.tiles.to_vec(),
                    remaining: a.remaining,
                })
                .collect(),
            tokens,
            chars,
            current_turn: state.current,
            player_names: state.player_names.clone(),
            turn: TurnView {
                card_played: ts.card_played,
                used_movement: ts.used_movement,
                used_action: ts.used_action,
            },
            last_discard: state.last_discard.clone(),
            energy: state.energy.balances().clone(),
            energy_max: state.energy.max(),
            fx,
            round: state.round,
            winner: state.winner,
        }
    }
}
