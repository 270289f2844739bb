//! Token movement.

use crate::board::TileId;
use crate::core::{CharacterId, MatchState, Side};
use crate::error::{ActionError, ActionResult};
use crate::events::{MoveEvent, Notification, Outbox};

/// Steps `id` may take on its next move this turn.
///
/// Base is the first-move allowance if the token never moved, else the
/// regular allowance; then the side's persistent and one-shot step bonuses,
/// the character's one-turn move bonus and any transform bonus.
#[must_use]
pub fn move_budget(state: &MatchState, id: CharacterId) -> u32 {
    let rules = state.config.rules.movement;
    let Some(token) = state.token(id) else {
        return 0;
    };
    let base = if token.has_moved_ever { rules.steps } else { rules.first_move_steps };
    let turn = &state.turn[token.owner];
    let (move_bonus, transform) = state
        .character(id)
        .map_or((0, 0), |c| (c.status.move_bonus, c.status.transform().map_or(0, |t| t.extra_moves)));
    base + turn.steps_bonus + turn.steps_bonus_next + move_bonus + transform
}

/// Check a move without applying it. Returns the path length.
pub fn validate_move(state: &MatchState, side: Side, id: CharacterId, to: TileId) -> ActionResult<u32> {
    let token = state.token(id).ok_or(ActionError::NotOnBoard(id))?;
    if token.owner != side {
        return Err(ActionError::NotOwner(id));
    }
    if state.character(id).is_some_and(|c| c.status.is_rooted()) {
        return Err(ActionError::Rooted);
    }
    if state.turn[side].moved.contains(&id) {
        return Err(ActionError::AlreadyMoved);
    }
    if !state.board.contains(to) {
        return Err(ActionError::UnknownTile(to));
    }
    if state.is_occupied(to) {
        return Err(ActionError::Occupied(to));
    }
    if state.is_walled(to) {
        return Err(ActionError::Walled(to));
    }

    let distance = state.open_distance(token.tile, to).ok_or(ActionError::Unreachable)?;
    let limit = move_budget(state, id);
    if distance > limit {
        return Err(ActionError::OutOfRange { distance, limit });
    }
    let min = state.turn[side].min_steps;
    if distance < min {
        return Err(ActionError::TooShort { distance, min });
    }
    Ok(distance)
}

/// Move a token, consuming the one-shot step bonus.
pub fn apply_move(state: &mut MatchState, side: Side, id: CharacterId, to: TileId, out: &mut Outbox) -> ActionResult<()> {
    let distance = validate_move(state, side, id, to)?;

    if let Some(token) = state.tokens.get_mut(&id) {
        token.tile = to;
        token.has_moved_ever = true;
    }
    let turn = &mut state.turn[side];
    turn.moved.insert(id);
    turn.steps_bonus_next = 0;

    tracing::debug!(room = %state.room, %id, %to, distance, "moved");
    out.broadcast(Notification::Move(MoveEvent { id, owner: side, to_tile: to, captured_id: None }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameRng, MatchConfig, MatchMode, RoomId};
    use crate::status::StatusEffect;
    use std::sync::Arc;

    fn id(s: &str) -> CharacterId {
        s.parse().unwrap()
    }

    fn t(s: &str) -> TileId {
        s.parse().unwrap()
    }

    fn state() -> MatchState {
        MatchState::new(
            RoomId::new("mv"),
            MatchMode::Standard,
            Arc::new(MatchConfig::default()),
            Box::new(GameRng::new(9)),
        )
    }

    #[test]
    fn test_first_move_allows_two_steps() {
        let mut st = state();
        assert_eq!(move_budget(&st, id("P1")), 2);
        let mut out = Outbox::new();
        apply_move(&mut st, Side::Player1, id("P1"), t("G1"), &mut out).unwrap();
        assert_eq!(st.token(id("P1")).unwrap().tile, t("G1"));
        assert_eq!(move_budget(&st, id("P1")), 1);
    }

    #[test]
    fn test_second_move_same_turn_rejected() {
        let mut st = state();
        let mut out = Outbox::new();
        apply_move(&mut st, Side::Player1, id("P1"), t("H1"), &mut out).unwrap();
        let err = apply_move(&mut st, Side::Player1, id("P1"), t("G1"), &mut out).unwrap_err();
        assert_eq!(err, ActionError::AlreadyMoved);
    }

    #[test]
    fn test_rooted_cannot_move() {
        let mut st = state();
        st.characters
            .get_mut(&id("P1"))
            .unwrap()
            .status
            .apply(StatusEffect::Root { turns: 2 });
        let err = validate_move(&st, Side::Player1, id("P1"), t("H1")).unwrap_err();
        assert_eq!(err.to_string(), "rooted");
    }

    #[test]
    fn test_wrong_owner_and_bad_tiles() {
        let mut st = state();
        assert_eq!(validate_move(&st, Side::Player1, id("E1"), t("B1")), Err(ActionError::NotOwner(id("E1"))));
        assert_eq!(validate_move(&st, Side::Player1, id("P1"), t("I2")), Err(ActionError::Occupied(t("I2"))));
        st.walls.insert(t("H1"), 8);
        assert_eq!(validate_move(&st, Side::Player1, id("P1"), t("H1")), Err(ActionError::Walled(t("H1"))));
        assert!(matches!(
            validate_move(&st, Side::Player1, id("P1"), t("E1")),
            Err(ActionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_step_bonuses() {
        let mut st = state();
        st.tokens.get_mut(&id("P1")).unwrap().has_moved_ever = true;
        st.turn[Side::Player1].steps_bonus = 2;
        st.turn[Side::Player1].steps_bonus_next = 1;
        assert_eq!(move_budget(&st, id("P1")), 4);

        let mut out = Outbox::new();
        apply_move(&mut st, Side::Player1, id("P1"), t("H1"), &mut out).unwrap();
        assert_eq!(st.turn[Side::Player1].steps_bonus_next, 0);
    }

    #[test]
    fn test_min_steps() {
        let mut st = state();
        st.turn[Side::Player1].min_steps = 2;
        assert!(matches!(
            validate_move(&st, Side::Player1, id("P1"), t("H1")),
            Err(ActionError::TooShort { distance: 1, min: 2 })
        ));
        assert_eq!(validate_move(&st, Side::Player1, id("P1"), t("G1")), Ok(2));
    }
}
