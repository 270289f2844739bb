//! Control-mode integration tests.
//!
//! These verify round thresholds, the mirrored layout after a round, match
//! end on the third round win, and respawn placement.

use std::sync::Arc;

use hex_tactics::control::{enqueue_respawn, process_respawns, score_turn_pair};
use hex_tactics::effects::EffectResolver;
use hex_tactics::events::Outbox;
use hex_tactics::{
    CharacterId, GameRng, Match, MatchConfig, MatchMode, MatchState, ParticipantId, Request, RoomId, Side, TileId,
};

fn id(s: &str) -> CharacterId {
    s.parse().unwrap()
}

fn t(s: &str) -> TileId {
    s.parse().unwrap()
}

fn control_state() -> MatchState {
    MatchState::new(
        RoomId::new("ctl"),
        MatchMode::Control,
        Arc::new(MatchConfig::default()),
        Box::new(GameRng::new(5)),
    )
}

fn place(state: &mut MatchState, who: &str, tile: TileId) {
    state.tokens.get_mut(&id(who)).unwrap().tile = tile;
}

/// Put P1 on the anchor and P2 on a scoring tile, then score until a round ends.
fn win_round(state: &mut MatchState, out: &mut Outbox) -> u32 {
    let control = state.control.clone().unwrap();
    place(state, "P1", control.anchor);
    place(state, "P2", control.tiles[0]);
    let mut passes = 0;
    loop {
        passes += 1;
        if let Some(winner) = score_turn_pair(state, out) {
            assert_eq!(winner, Side::Player1);
            return passes;
        }
        assert!(passes < 10, "round never ended");
    }
}

/// Test that crossing the round target resets progress and counts one win.
#[test]
fn test_round_threshold() {
    let mut st = control_state();
    let mut out = Outbox::new();
    // 3 points per pass: 3, 6, 9, 12
    assert_eq!(win_round(&mut st, &mut out), 4);

    let control = st.control.as_ref().unwrap();
    assert_eq!(control.scores[Side::Player1], 1);
    assert_eq!(control.progress[Side::Player1], 0);
    assert_eq!(control.tally[Side::Player1], 12);
    assert!(!st.is_over());
    assert_eq!(out.iter().filter(|e| e.notification.name() == "roundWon").count(), 1);
}

/// Test that a round win mirrors the anchor along its row.
#[test]
fn test_round_mirrors_layout() {
    let mut st = control_state();
    let before = st.control.clone().unwrap();
    let mut out = Outbox::new();
    win_round(&mut st, &mut out);

    let after = st.control.as_ref().unwrap();
    assert_eq!(before.anchor, t("E1"));
    assert_eq!(after.anchor, t("E8"));
    for (old, new) in before.tiles.iter().zip(after.tiles.iter()) {
        assert_eq!(old.row(), new.row());
    }
}

/// Test that the third round win ends the match.
#[test]
fn test_third_round_wins_match() {
    let mut st = control_state();
    let mut out = Outbox::new();
    for round in 1..=3 {
        win_round(&mut st, &mut out);
        assert_eq!(st.is_over(), round == 3);
    }
    assert_eq!(st.winner, Some(Side::Player1));
    assert_eq!(out.iter().filter(|e| e.notification.name() == "gameOver").count(), 1);
}

/// Test that a dead character comes back on the mirrored row after a round.
#[test]
fn test_respawn_on_mirrored_row() {
    let mut st = control_state();
    let mut out = Outbox::new();
    EffectResolver::apply_damage(&mut st, &mut out, id("E2"), 99);
    assert!(st.token(id("E2")).is_none());
    assert!(st.respawn_queue[Side::Player2].contains(&id("E2")));

    win_round(&mut st, &mut out);
    process_respawns(&mut st, Side::Player2, &mut out);

    let tile = st.token(id("E2")).unwrap().tile;
    assert_eq!(tile, t("A1"));
    let c = st.character(id("E2")).unwrap();
    assert!(!c.dead);
    assert_eq!(c.hp, c.max_hp);
    assert!(st.respawn_queue[Side::Player2].is_empty());
}

/// Test that a respawn waits while its row is full.
#[test]
fn test_respawn_waits_for_room() {
    let mut st = control_state();
    let mut out = Outbox::new();
    EffectResolver::apply_damage(&mut st, &mut out, id("E2"), 99);
    for (who, tile) in [("E1", "A1"), ("E3", "A2"), ("E4", "A3"), ("P1", "A4")] {
        place(&mut st, who, t(tile));
    }
    process_respawns(&mut st, Side::Player2, &mut out);
    assert!(st.token(id("E2")).is_none());
    assert_eq!(st.respawn_queue[Side::Player2].len(), 1);

    place(&mut st, "P1", t("E4"));
    process_respawns(&mut st, Side::Player2, &mut out);
    assert_eq!(st.token(id("E2")).unwrap().tile, t("A4"));
}

/// Test that standard mode never queues respawns.
#[test]
fn test_standard_mode_has_no_respawns() {
    let mut st = MatchState::new(
        RoomId::new("std"),
        MatchMode::Standard,
        Arc::new(MatchConfig::default()),
        Box::new(GameRng::new(5)),
    );
    enqueue_respawn(&mut st, id("E2"));
    assert!(st.respawn_queue[Side::Player2].is_empty());
}

/// Test that a join asking for control mode sets it at lock.
#[test]
fn test_join_requests_control_mode() {
    let mut game = Match::new(RoomId::new("ctl-join"), Arc::new(MatchConfig::default()), 4);
    let join = |mode| Request::Join { room: RoomId::new("ctl-join"), name: None, heroes: Vec::new(), mode };
    game.dispatch(&ParticipantId::new("a"), join(Some(MatchMode::Control)));
    game.dispatch(&ParticipantId::new("b"), join(None));
    assert_eq!(game.state().mode, MatchMode::Control);
    assert_eq!(game.state().token(id("P1")).unwrap().tile, t("H4"));
    assert!(game.snapshot().control.is_some());
}
