//! Respawn queue for control mode.

use crate::board::TileId;
use crate::core::state::Token;
use crate::core::{CharacterId, MatchState, Side};
use crate::events::{Notification, Outbox, Respawned};

/// Queue a dead character for respawn. No-op outside control mode or if already queued.
pub fn enqueue_respawn(state: &mut MatchState, id: CharacterId) {
    if state.control.is_none() {
        return;
    }
    let queue = &mut state.respawn_queue[id.side()];
    if !queue.contains(&id) {
        queue.push_back(id);
    }
}

/// Nearest free tile on the same row as `preferred`, searching up to `radius` steps.
fn open_tile_near(state: &MatchState, preferred: TileId, radius: u32) -> Option<TileId> {
    state
        .board
        .area(preferred, radius, |t| !state.board.same_row(t, preferred))
        .into_iter()
        .find(|t| !state.is_occupied(*t) && !state.is_walled(*t))
}

/// Bring back every queued character of `side` that has room to stand.
///
/// Characters whose respawn row is full stay queued for the next turn.
pub fn process_respawns(state: &mut MatchState, side: Side, out: &mut Outbox) {
    let Some(control) = state.control.as_ref() else {
        return;
    };
    let radius = state.config.rules.control.respawn_radius;
    let queued: Vec<CharacterId> = state.respawn_queue[side].iter().copied().collect();
    let mut waiting = im::Vector::new();

    for id in queued {
        if state.tokens.contains_key(&id) || !state.characters.contains_key(&id) {
            continue;
        }
        let Some(spawn) = control.respawns.get(&id).copied() else {
            continue;
        };
        let Some(tile) = open_tile_near(state, spawn, radius) else {
            tracing::debug!(room = %state.room, %id, "respawn row full, staying queued");
            waiting.push_back(id);
            continue;
        };
        if let Some(c) = state.characters.get_mut(&id) {
            c.reset();
        }
        state.tokens.insert(id, Token { owner: side, tile, has_moved_ever: false });
        tracing::debug!(room = %state.room, %id, %tile, "respawned");
        out.broadcast(Notification::Respawn(Respawned { id, tile, owner: side }));
    }
    state.respawn_queue[side] = waiting;
}
