//! The match engine: one room's state, seats and history.
//!
//! `Match` is the only thing a host talks to. Each request runs against a
//! draft copy of the state; the draft and its notifications replace the
//! live state only if the handler succeeds, so a refused request changes
//! nothing and emits nothing but its own feedback.
//!
//! ## Determinism
//!
//! All randomness comes from the match's `RandomSource`. A match created
//! with the same seed and fed the same accepted requests (the [`ReplayLog`])
//! reaches the same state; see [`Match::replay`].

use std::sync::Arc;

use crate::core::{
    CharacterId, GameRng, MatchConfig, MatchMode, MatchState, ParticipantId, RandomSource, ReplayLog, Request,
    RoomId, Seat, Side, SLOTS_PER_SIDE,
};
use crate::error::{ActionError, ActionResult, ErrorKind};
use crate::events::{
    AbilityKind, Envelope, FullState, HeroesInvalid, InsufficientEnergy, InvalidMove, Notification, Outbox,
};
use crate::status::ticks::start_of_turn;

use super::abilities::{use_ability, Aim};
use super::cards::{play_card, reveal_card, CardArgs};
use super::movement::apply_move;
use super::seating::{Participant, Seating};
use super::turn::{end_turn, maybe_end_turn};
use super::declare_winner;

/// One room's match.
#[derive(Debug)]
pub struct Match {
    state: MatchState,
    seating: Seating,
    log: ReplayLog,
}

impl Match {
    /// New match whose randomness is fully determined by `seed`.
    #[must_use]
    pub fn new(room: RoomId, config: Arc<MatchConfig>, seed: u64) -> Self {
        let rng = GameRng::new(seed).for_context(room.as_str());
        let mut game = Self::with_random_source(room, config, Box::new(rng));
        game.log = ReplayLog::new(seed);
        game
    }

    /// New match drawing from a caller-supplied random source.
    #[must_use]
    pub fn with_random_source(room: RoomId, config: Arc<MatchConfig>, rng: Box<dyn RandomSource>) -> Self {
        tracing::info!(%room, "match created");
        Self {
            state: MatchState::new(room, MatchMode::Standard, config, rng),
            seating: Seating::new(),
            log: ReplayLog::default(),
        }
    }

    /// Rebuild a match by feeding a log to a fresh match with the log's seed.
    #[must_use]
    pub fn replay(room: RoomId, config: Arc<MatchConfig>, log: &ReplayLog) -> Self {
        let mut game = Self::new(room, config, log.seed);
        for record in &log.records {
            game.dispatch(&record.from, record.request.clone());
        }
        game
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    #[must_use]
    pub fn room(&self) -> &RoomId {
        &self.state.room
    }

    #[must_use]
    pub fn seat_of(&self, participant: &ParticipantId) -> Seat {
        self.seating.seat_of(participant)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.seating.is_locked()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.state.winner
    }

    #[must_use]
    pub fn snapshot(&self) -> FullState {
        FullState::capture(&self.state)
    }

    /// Handle a request, turning a refusal into its feedback notification.
    pub fn dispatch(&mut self, from: &ParticipantId, request: Request) -> Vec<Envelope> {
        let feedback_target = match &request {
            Request::Move { id, .. } => Some(*id),
            _ => None,
        };
        match self.handle(from, request) {
            Ok(envelopes) => envelopes,
            Err(err) => match Self::feedback(&err, from, feedback_target) {
                Some(reply) => vec![reply],
                // other refusals resync the requester's view
                None if self.seating.side_of(from).is_some() => {
                    vec![Envelope::to(from.clone(), Notification::FullState(Box::new(self.snapshot())))]
                }
                None => Vec::new(),
            },
        }
    }

    /// Handle a request. On success returns the notifications to deliver.
    pub fn handle(&mut self, from: &ParticipantId, request: Request) -> ActionResult<Vec<Envelope>> {
        if let Request::Join { name, heroes, mode, .. } = &request {
            let participant = Participant { id: from.clone(), name: name.clone(), heroes: heroes.clone(), mode: *mode };
            let envelopes = self.join(participant);
            self.log.push(from.clone(), request, self.state.round);
            return Ok(envelopes);
        }

        let side = self.seating.side_of(from).ok_or(ActionError::NotSeated)?;
        if self.state.is_over() {
            return Err(ActionError::MatchOver);
        }
        if side != self.state.current {
            return Err(ActionError::NotYourTurn);
        }

        let mut draft = self.state.clone();
        let mut out = Outbox::new();
        if let Err(err) = apply(&mut draft, side, &request, &mut out) {
            tracing::debug!(room = %self.state.room, %side, request = request.name(), %err, "request refused");
            return Err(err);
        }
        if !matches!(request, Request::EndTurn) {
            maybe_end_turn(&mut draft, side, &mut out);
        }
        out.broadcast(Notification::FullState(Box::new(FullState::capture(&draft))));

        self.state = draft;
        self.log.push(from.clone(), request, self.state.round);
        Ok(out.into_vec())
    }

    /// Targeted reply for a refused request, if its kind warrants one.
    ///
    /// Refused moves get `invalidMove` and energy shortfalls get
    /// `insufficientEnergy`. Anything else returns `None`, and `dispatch`
    /// answers a seated requester with a fresh `fullState` instead.
    #[must_use]
    pub fn feedback(err: &ActionError, to: &ParticipantId, moved: Option<CharacterId>) -> Option<Envelope> {
        match (err.kind(), err) {
            (ErrorKind::Shortfall, ActionError::InsufficientEnergy { card, have, required }) => Some(Envelope::to(
                to.clone(),
                Notification::InsufficientEnergy(InsufficientEnergy { card: card.clone(), have: *have, required: *required }),
            )),
            (ErrorKind::Rejected, _) if moved.is_some() => Some(Envelope::to(
                to.clone(),
                Notification::InvalidMove(InvalidMove { id: moved, reason: err.to_string() }),
            )),
            _ => None,
        }
    }

    /// A participant left. A seated player leaving a live match forfeits it.
    pub fn disconnect(&mut self, who: &ParticipantId) -> Vec<Envelope> {
        let locked = self.seating.is_locked();
        let side = self.seating.remove(who);
        let mut out = Outbox::new();
        if let (true, Some(side)) = (locked, side) {
            if !self.state.is_over() {
                tracing::info!(room = %self.state.room, %who, %side, "seated player left, forfeit");
                declare_winner(&mut self.state, side.opponent(), &mut out);
                out.broadcast(Notification::FullState(Box::new(self.snapshot())));
            }
        }
        out.into_vec()
    }

    fn join(&mut self, participant: Participant) -> Vec<Envelope> {
        let who = participant.id.clone();
        self.seating.upsert(participant);
        let mut out = Outbox::new();

        if self.seating.is_ready() {
            self.lock(&mut out);
        } else {
            if self.seating.is_locked() {
                out.send_to(&who, Notification::AssignRole(self.seating.seat_of(&who)));
            }
            out.send_to(&who, Notification::FullState(Box::new(self.snapshot())));
        }
        out.into_vec()
    }

    /// Seat the first two participants, apply their picks and start player 1's turn.
    fn lock(&mut self, out: &mut Outbox) {
        let swap = self.state.rng.coin_flip();
        let Some(seated) = self.seating.lock(swap) else {
            return;
        };
        let config = self.state.config.clone();

        for (side, participant) in seated.iter() {
            match config.roster.assign(&participant.heroes) {
                Ok(picks) => {
                    for (slot, pick) in (0..SLOTS_PER_SIDE).zip(picks) {
                        let Some(id) = CharacterId::new(side, slot) else {
                            continue;
                        };
                        let kit = config.roster.kit(id.role(), pick);
                        self.state.equip(id, pick.map(|h| (h.id.as_str(), h.name.as_str())), kit);
                    }
                }
                Err(err) => {
                    tracing::debug!(room = %self.state.room, %side, %err, "hero picks refused");
                    out.send_to(&participant.id, Notification::HeroesInvalid(HeroesInvalid { reason: err.to_string() }));
                }
            }
            self.state.player_names[side] = participant.name.clone();
        }

        let mode = self.seating.requested_mode();
        self.state.set_mode(mode);
        for (side, participant) in seated.iter() {
            out.send_to(&participant.id, Notification::AssignRole(Seat::from(side)));
        }
        tracing::info!(room = %self.state.room, ?mode, player1 = %seated.player1.id, player2 = %seated.player2.id, "seats locked");

        start_of_turn(&mut self.state, Side::Player1, out);
        out.broadcast(Notification::FullState(Box::new(self.snapshot())));
    }
}

/// Route a gameplay request to its handler.
fn apply(state: &mut MatchState, side: Side, request: &Request, out: &mut Outbox) -> ActionResult<()> {
    match request {
        Request::Join { .. } => Ok(()),
        Request::Move { id, to_tile } => apply_move(state, side, *id, *to_tile, out),
        Request::UsePrimary { source_id, target_id } => {
            let aim = Aim { target: *target_id, tile: None };
            use_ability(state, side, AbilityKind::Primary, *source_id, aim, out)
        }
        Request::UseSpecial { source_id, target_id, center_tile } => {
            let aim = Aim { target: *target_id, tile: *center_tile };
            use_ability(state, side, AbilityKind::Special, *source_id, aim, out)
        }
        Request::PlayCard { card, tile, source_id, to_tile, target_id } => {
            let args = CardArgs { tile: *tile, source: *source_id, to_tile: *to_tile, target: *target_id };
            play_card(state, side, *card, args, out)
        }
        Request::RevealCard { card } => reveal_card(state, side, *card, out),
        Request::EndTurn => {
            end_turn(state, out);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Audience;

    fn participant(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn join(room: &str, heroes: &[&str]) -> Request {
        Request::Join {
            room: RoomId::new(room),
            name: None,
            heroes: heroes.iter().map(|h| h.to_string()).collect(),
            mode: None,
        }
    }

    fn started(seed: u64) -> (Match, ParticipantId, ParticipantId) {
        let mut game = Match::new(RoomId::new("e"), Arc::new(MatchConfig::default()), seed);
        game.dispatch(&participant("a"), join("e", &[]));
        game.dispatch(&participant("b"), join("e", &[]));
        let p1 = if game.seat_of(&participant("a")) == Seat::Player1 { participant("a") } else { participant("b") };
        let p2 = if p1 == participant("a") { participant("b") } else { participant("a") };
        (game, p1, p2)
    }

    #[test]
    fn test_lock_assigns_both_seats() {
        let (game, p1, p2) = started(1);
        assert!(game.is_locked());
        assert_eq!(game.seat_of(&p1), Seat::Player1);
        assert_eq!(game.seat_of(&p2), Seat::Player2);
        assert_eq!(game.state().current, Side::Player1);
    }

    #[test]
    fn test_refused_request_changes_nothing() {
        let (mut game, p1, p2) = started(2);
        let before = game.snapshot();
        let envelopes = game.dispatch(&p2, Request::EndTurn);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].audience, Audience::Participant(p2.clone()));
        assert_eq!(envelopes[0].notification, Notification::FullState(Box::new(before.clone())));

        let bad = Request::Move { id: "P1".parse().unwrap(), to_tile: "E1".parse().unwrap() };
        let envelopes = game.dispatch(&p1, bad);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].audience, Audience::Participant(p1.clone()));
        assert_eq!(envelopes[0].notification.name(), "invalidMove");
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_accepted_request_ends_with_full_state() {
        let (mut game, p1, _) = started(3);
        let envelopes = game.dispatch(&p1, Request::Move { id: "P1".parse().unwrap(), to_tile: "H1".parse().unwrap() });
        let names: Vec<_> = envelopes.iter().map(|e| e.notification.name()).collect();
        assert_eq!(names, vec!["move", "fullState"]);
        assert_eq!(game.log().len(), 3);
    }

    #[test]
    fn test_spectator_cannot_act() {
        let (mut game, _, _) = started(4);
        let envelopes = game.dispatch(&participant("c"), join("e", &[]));
        assert_eq!(envelopes[0].notification, Notification::AssignRole(Seat::Spectator));
        assert_eq!(game.handle(&participant("c"), Request::EndTurn), Err(ActionError::NotSeated));
    }

    #[test]
    fn test_invalid_heroes_keep_defaults() {
        let mut game = Match::new(RoomId::new("h"), Arc::new(MatchConfig::default()), 5);
        game.dispatch(&participant("a"), join("h", &["voodoo", "loadstone", "aimbot", "don_atore"]));
        let envelopes = game.dispatch(&participant("b"), join("h", &["voodoo", "aimbot", "trickster", "don_atore"]));
        let invalid: Vec<_> = envelopes.iter().filter(|e| e.notification.name() == "heroes:invalid").collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].audience, Audience::Participant(participant("a")));

        let side_b = game.seat_of(&participant("b")).side().unwrap();
        let tank = CharacterId::new(side_b, 0).unwrap();
        assert_eq!(game.state().character(tank).unwrap().name, "Voodoo");
        let side_a = side_b.opponent();
        let tank = CharacterId::new(side_a, 0).unwrap();
        assert_eq!(game.state().character(tank).unwrap().name, "Tank");
    }

    #[test]
    fn test_disconnect_forfeits() {
        let (mut game, p1, _) = started(6);
        let envelopes = game.disconnect(&p1);
        assert_eq!(game.winner(), Some(Side::Player2));
        assert_eq!(envelopes[0].notification.name(), "gameOver");
        assert_eq!(game.handle(&p1, Request::EndTurn), Err(ActionError::NotSeated));
    }
}
