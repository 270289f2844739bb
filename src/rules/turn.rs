//! Turn handoff.

use crate::control::score_turn_pair;
use crate::core::{MatchMode, MatchState, Side, TurnState};
use crate::effects::AuraPulse;
use crate::events::{Notification, Outbox};
use crate::status::ticks;

/// `(used_movement, used_action)` for `side`: every living character has
/// moved (or is rooted), and every living character has acted.
#[must_use]
pub fn turn_usage(state: &MatchState, side: Side) -> (bool, bool) {
    let turn = &state.turn[side];
    let mut living = state.living(side).peekable();
    if living.peek().is_none() {
        return (false, false);
    }
    let (mut moved, mut acted) = (true, true);
    for id in living {
        let rooted = state.character(id).is_some_and(|c| c.status.is_rooted());
        moved &= turn.moved.contains(&id) || rooted;
        acted &= turn.acted.contains(&id);
    }
    (moved, acted)
}

/// Refresh the side's usage flags and hand the turn over if both are set.
///
/// Returns whether the turn ended.
pub fn maybe_end_turn(state: &mut MatchState, side: Side, out: &mut Outbox) -> bool {
    if state.is_over() || state.current != side {
        return false;
    }
    let (used_movement, used_action) = turn_usage(state, side);
    let turn = &mut state.turn[side];
    turn.used_movement = used_movement;
    turn.used_action = used_action;
    if used_movement && used_action {
        end_turn(state, out);
        true
    } else {
        false
    }
}

/// Finish the current side's turn and start the opponent's.
pub fn end_turn(state: &mut MatchState, out: &mut Outbox) {
    if state.is_over() {
        return;
    }
    let prev = state.current;
    let next = prev.opponent();

    let gained = state.energy.grant_income(prev, state.round, &state.config.rules.energy.income);
    ticks::tick_walls(state);
    ticks::aura_wall_heals(state, prev, out);

    if prev == Side::Player2 {
        if state.mode == MatchMode::Control {
            score_turn_pair(state, out);
        }
        state.round += 1;
    }
    if state.is_over() {
        return;
    }

    ticks::pulse_heal_auras(state, prev, AuraPulse::EndOfTurn, out);
    ticks::expire_heal_auras(state, prev);
    ticks::tick_aura_layers(state, prev);
    ticks::trait_heals(state, prev, out);
    ticks::settle_characters(state, prev);

    state.current = next;
    state.turn[prev] = TurnState::default();
    tracing::debug!(room = %state.room, %prev, %next, round = state.round, gained, "turn handed over");
    out.broadcast(Notification::NextTurn(next));
    ticks::start_of_turn(state, next, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CharacterId, GameRng, MatchConfig, RoomId};
    use crate::status::StatusEffect;
    use std::sync::Arc;

    fn id(s: &str) -> CharacterId {
        s.parse().unwrap()
    }

    fn state() -> MatchState {
        MatchState::new(
            RoomId::new("turn"),
            MatchMode::Standard,
            Arc::new(MatchConfig::default()),
            Box::new(GameRng::new(6)),
        )
    }

    #[test]
    fn test_handoff_grants_income_and_flips() {
        let mut st = state();
        let mut out = Outbox::new();
        end_turn(&mut st, &mut out);
        assert_eq!(st.current, Side::Player2);
        assert_eq!(st.energy.balance(Side::Player1), 1);
        assert_eq!(st.round, 1);

        end_turn(&mut st, &mut out);
        assert_eq!(st.current, Side::Player1);
        assert_eq!(st.round, 2);
        assert!(out.iter().any(|e| e.notification == Notification::NextTurn(Side::Player2)));
    }

    #[test]
    fn test_cooldowns_tick_on_owner_handoff_only() {
        let mut st = state();
        st.characters.get_mut(&id("E1")).unwrap().special_cooldown = 2;
        let mut out = Outbox::new();
        end_turn(&mut st, &mut out);
        assert_eq!(st.character(id("E1")).unwrap().special_cooldown, 2);
        end_turn(&mut st, &mut out);
        assert_eq!(st.character(id("E1")).unwrap().special_cooldown, 1);
    }

    #[test]
    fn test_auto_end_when_everyone_done() {
        let mut st = state();
        let mut out = Outbox::new();
        for who in ["P1", "P2", "P3"] {
            st.turn[Side::Player1].moved.insert(id(who));
            st.turn[Side::Player1].acted.insert(id(who));
        }
        st.turn[Side::Player1].acted.insert(id("P4"));
        assert!(!maybe_end_turn(&mut st, Side::Player1, &mut out));
        assert!(st.turn[Side::Player1].used_action);
        assert!(!st.turn[Side::Player1].used_movement);

        // a rooted character counts as moved
        st.characters
            .get_mut(&id("P4"))
            .unwrap()
            .status
            .apply(StatusEffect::Root { turns: 2 });
        assert_eq!(turn_usage(&st, Side::Player1), (true, true));
        assert!(maybe_end_turn(&mut st, Side::Player1, &mut out));
        assert_eq!(st.current, Side::Player2);
        assert!(st.turn[Side::Player1].moved.is_empty());
    }

    #[test]
    fn test_control_scoring_after_player_two() {
        let mut st = MatchState::new(
            RoomId::new("ctl"),
            MatchMode::Control,
            Arc::new(MatchConfig::default()),
            Box::new(GameRng::new(6)),
        );
        st.tokens.get_mut(&id("E1")).unwrap().tile = "E1".parse().unwrap();
        let mut out = Outbox::new();
        end_turn(&mut st, &mut out);
        assert_eq!(st.control.as_ref().unwrap().progress[Side::Player2], 0);
        end_turn(&mut st, &mut out);
        assert_eq!(st.control.as_ref().unwrap().progress[Side::Player2], 2);
    }
}
