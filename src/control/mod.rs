//! Control-point mode: scoring, round wins, side flips and respawns.
//!
//! ## Scoring
//!
//! After every full turn pair (that is, when player 2 ends its turn), each
//! living token standing on the anchor earns its side 2 points and each on
//! a scoring tile 1 point. Reaching the round target wins the round.
//!
//! ## Rounds
//!
//! A round win resets both progress counters and mirrors the anchor, the
//! scoring tiles and every respawn point horizontally (same row), so sides
//! swap which flank they attack. The first side to the configured number of
//! round wins takes the match.
//!
//! ## Respawns
//!
//! Characters that die in control mode are queued and come back at the
//! start of their owner's next turn.

pub mod respawn;
pub mod scoring;

pub use respawn::{enqueue_respawn, process_respawns};
pub use scoring::score_turn_pair;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::board::{Board, TileId};
use crate::core::config::ControlRules;
use crate::core::{CharacterId, SideMap};

/// Control-point sub-state of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub anchor: TileId,
    pub tiles: SmallVec<[TileId; 3]>,
    /// Round wins.
    pub scores: SideMap<u32>,
    /// Points toward the current round.
    pub progress: SideMap<u32>,
    /// Points earned over the whole match.
    pub tally: SideMap<u32>,
    pub round: u32,
    pub respawns: BTreeMap<CharacterId, TileId>,
}

impl ControlState {
    /// Initial layout: the configured anchor plus its neighbours nearest the board centre.
    #[must_use]
    pub fn new(board: &Board, rules: &ControlRules) -> Self {
        Self {
            anchor: rules.anchor,
            tiles: scoring_tiles(board, rules.anchor, rules.max_tiles),
            scores: SideMap::default(),
            progress: SideMap::default(),
            tally: SideMap::default(),
            round: 1,
            respawns: rules.spawns.clone(),
        }
    }

    /// Mirror anchor, scoring tiles and respawn points across the board.
    pub fn mirror(&mut self, board: &Board) {
        if let Some(anchor) = board.mirror_horizontal(self.anchor) {
            self.anchor = anchor;
        }
        for tile in self.tiles.iter_mut().chain(self.respawns.values_mut()) {
            if let Some(m) = board.mirror_horizontal(*tile) {
                *tile = m;
            }
        }
    }

    /// Points a token on `tile` earns per scoring pass.
    #[must_use]
    pub fn points_at(&self, tile: TileId, rules: &ControlRules) -> u32 {
        if tile == self.anchor {
            rules.anchor_points
        } else if self.tiles.contains(&tile) {
            rules.tile_points
        } else {
            0
        }
    }
}

fn scoring_tiles(board: &Board, anchor: TileId, max: usize) -> SmallVec<[TileId; 3]> {
    let center = board.center();
    let mut near: Vec<TileId> = board.neighbors(anchor).to_vec();
    near.sort_by(|a, b| {
        let da = board.position(*a).map_or(f64::MAX, |p| p.distance_sq(center));
        let db = board.position(*b).map_or(f64::MAX, |p| p.distance_sq(center));
        da.total_cmp(&db)
    });
    near.into_iter().take(max).collect()
}
