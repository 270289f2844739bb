//! Match flow integration tests.
//!
//! These drive a `Match` (and the registry) through requests only, the way
//! a transport would, and check seats, turn gating, movement budgets,
//! refusals, replay and forfeits.

use std::sync::Arc;

use hex_tactics::core::CardKind;
use hex_tactics::{
    ActionError, Audience, CharacterId, Match, MatchConfig, MatchRegistry, ParticipantId, Request, RoomId, Seat,
    Side, TileId,
};

fn id(s: &str) -> CharacterId {
    s.parse().unwrap()
}

fn t(s: &str) -> TileId {
    s.parse().unwrap()
}

fn join(room: &str) -> Request {
    Request::Join { room: RoomId::new(room), name: None, heroes: Vec::new(), mode: None }
}

fn step(who: &str, to: &str) -> Request {
    Request::Move { id: id(who), to_tile: t(to) }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two joined participants; returns the match plus (player 1, player 2).
fn started(room: &str, seed: u64) -> (Match, ParticipantId, ParticipantId) {
    init_tracing();
    let mut game = Match::new(RoomId::new(room), Arc::new(MatchConfig::default()), seed);
    let (a, b) = (ParticipantId::new("alice"), ParticipantId::new("bob"));
    game.dispatch(&a, join(room));
    game.dispatch(&b, join(room));
    match game.seat_of(&a) {
        Seat::Player1 => (game, a, b),
        _ => (game, b, a),
    }
}

// =============================================================================
// Seating
// =============================================================================

/// Test that the first joiner waits and the second locks the room.
#[test]
fn test_second_join_locks_room() {
    init_tracing();
    let mut game = Match::new(RoomId::new("lobby"), Arc::new(MatchConfig::default()), 1);
    let first = game.dispatch(&ParticipantId::new("alice"), join("lobby"));
    assert!(!game.is_locked());
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].notification.name(), "fullState");

    let second = game.dispatch(&ParticipantId::new("bob"), join("lobby"));
    assert!(game.is_locked());
    let roles = second.iter().filter(|e| e.notification.name() == "assignRole").count();
    assert_eq!(roles, 2);
    assert_eq!(second.last().unwrap().notification.name(), "fullState");
    assert_eq!(second.last().unwrap().audience, Audience::Room);
}

// =============================================================================
// Turn gating and movement
// =============================================================================

/// Test that only the side to move may act.
#[test]
fn test_turn_gate() {
    let (mut game, _, p2) = started("gate", 2);
    assert_eq!(game.handle(&p2, step("E1", "B1")), Err(ActionError::NotYourTurn));
}

/// Test the first-move allowance of two steps, then one step on later turns.
#[test]
fn test_movement_budget_two_then_one() {
    let (mut game, p1, p2) = started("budget", 3);
    game.handle(&p1, step("P1", "G1")).unwrap();
    game.handle(&p1, Request::EndTurn).unwrap();
    game.handle(&p2, Request::EndTurn).unwrap();

    assert!(matches!(game.handle(&p1, step("P1", "E1")), Err(ActionError::OutOfRange { distance: 2, limit: 1 })));
    game.handle(&p1, step("P1", "F1")).unwrap();
    assert_eq!(game.state().token(id("P1")).unwrap().tile, t("F1"));
}

/// Test that repeating a used action is refused without changing anything.
#[test]
fn test_repeat_action_refused_without_change() {
    let (mut game, p1, _) = started("repeat", 4);
    let mend = Request::UsePrimary { source_id: id("P4"), target_id: Some(id("P3")) };
    game.handle(&p1, mend.clone()).unwrap();

    let before = game.snapshot();
    let logged = game.log().len();
    assert_eq!(game.handle(&p1, mend.clone()), Err(ActionError::AlreadyActed));
    let replies = game.dispatch(&p1, mend);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].audience, Audience::Participant(p1.clone()));
    assert_eq!(replies[0].notification.name(), "fullState");
    assert_eq!(game.snapshot(), before);
    assert_eq!(game.log().len(), logged);
}

/// Test that a refused move is answered with a targeted `invalidMove`.
#[test]
fn test_invalid_move_feedback() {
    let (mut game, p1, _) = started("feedback", 5);
    let replies = game.dispatch(&p1, step("P1", "I2"));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].audience, Audience::Participant(p1));
    let payload = replies[0].notification.payload_json().unwrap();
    assert_eq!(payload["id"], "P1");
}

/// Test that a side may play a single card per turn.
#[test]
fn test_one_card_per_turn() {
    let (mut game, p1, p2) = started("cards", 6);
    let dash = Request::PlayCard { card: CardKind::Dash, tile: None, source_id: Some(id("P2")), to_tile: None, target_id: None };
    game.handle(&p1, dash).unwrap();
    assert_eq!(game.handle(&p1, Request::card(CardKind::Blink)), Err(ActionError::CardAlreadyPlayed));

    // resets with the turn
    game.handle(&p1, Request::EndTurn).unwrap();
    game.handle(&p2, Request::card(CardKind::Blink)).unwrap();
}

/// Test that an unaffordable card yields a targeted `insufficientEnergy`.
#[test]
fn test_insufficient_energy_feedback() {
    let (mut game, p1, _) = started("broke", 7);
    let replies = game.dispatch(&p1, Request::card(CardKind::Scope));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].notification.name(), "insufficientEnergy");
    let payload = replies[0].notification.payload_json().unwrap();
    assert_eq!(payload["card"], "Scope");
    assert_eq!(payload["required"], 2);
}

/// Test that moving and acting with every unit hands the turn over.
#[test]
fn test_turn_ends_when_everything_used() {
    let (mut game, p1, _) = started("auto", 8);
    for (who, to) in [("P1", "H1"), ("P2", "H2"), ("P3", "H3"), ("P4", "H4")] {
        game.handle(&p1, step(who, to)).unwrap();
    }
    let mend = |src: &str, dst: &str| Request::UsePrimary { source_id: id(src), target_id: Some(id(dst)) };
    // tank and DPS have nothing in reach; only support can act, so the turn stays open
    game.handle(&p1, mend("P4", "P3")).unwrap();
    assert_eq!(game.state().current, Side::Player1);

    game.handle(&p1, Request::EndTurn).unwrap();
    assert_eq!(game.state().current, Side::Player2);
}

// =============================================================================
// Replay and forfeit
// =============================================================================

/// Test that feeding the log to a fresh match reproduces the snapshot.
#[test]
fn test_replay_reaches_same_state() {
    let (mut game, p1, p2) = started("replay", 9);
    game.dispatch(&p1, step("P1", "G1"));
    game.dispatch(&p1, Request::EndTurn);
    game.dispatch(&p2, step("E2", "C2"));
    game.dispatch(&p2, Request::EndTurn);

    let bytes = game.log().to_bytes().unwrap();
    let log = hex_tactics::ReplayLog::from_bytes(&bytes).unwrap();
    let copy = Match::replay(RoomId::new("replay"), Arc::new(MatchConfig::default()), &log);
    assert_eq!(copy.snapshot(), game.snapshot());
    assert_eq!(copy.log(), game.log());
}

/// Test that a seated player leaving through the registry forfeits.
#[test]
fn test_registry_disconnect_forfeits() {
    init_tracing();
    let registry = MatchRegistry::new(Arc::new(MatchConfig::default()), 99);
    let room = RoomId::new("forfeit");
    let (a, b) = (ParticipantId::new("alice"), ParticipantId::new("bob"));
    registry.join(&room, &a, join("forfeit")).unwrap();
    registry.join(&room, &b, join("forfeit")).unwrap();

    let game = registry.get(&room).unwrap();
    let leaver = game.lock().unwrap().seat_of(&a).side().unwrap();

    let mut rx = registry.subscribe(&room).unwrap();
    let sent = registry.disconnect(&room, &a).unwrap();
    assert_eq!(sent[0].notification.name(), "gameOver");
    assert_eq!(rx.try_recv().unwrap(), sent[0]);
    assert_eq!(game.lock().unwrap().winner(), Some(leaver.opponent()));

    // the match stays until discarded; later requests are refused with a resync
    let replies = registry.dispatch(&room, &b, Request::EndTurn).unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].audience, Audience::Participant(b.clone()));
    assert_eq!(replies[0].notification.name(), "fullState");
    assert!(registry.discard(&room).unwrap());
}

/// Test that a spectator leaving does not end the match.
#[test]
fn test_spectator_disconnect_is_harmless() {
    let (mut game, _, _) = started("watch", 10);
    let watcher = ParticipantId::new("carol");
    game.dispatch(&watcher, join("watch"));
    assert!(game.disconnect(&watcher).is_empty());
    assert!(!game.is_over());
}
