//! Participants and seat assignment.
//!
//! Participants join in order. Once two distinct participants are present
//! the room locks: seats are fixed for the rest of the match and anyone
//! joining later is a spectator.

use serde::{Deserialize, Serialize};

use crate::core::{MatchMode, ParticipantId, Seat, Side, SideMap};

/// A connected participant and what they asked for on join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: Option<String>,
    pub heroes: Vec<String>,
    pub mode: Option<MatchMode>,
}

/// Seats of one room.
#[derive(Clone, Debug, Default)]
pub struct Seating {
    participants: Vec<Participant>,
    seats: SideMap<Option<ParticipantId>>,
    locked: bool,
}

impl Seating {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant, or refresh the picks of one already present.
    pub fn upsert(&mut self, participant: Participant) {
        match self.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// Drop a participant. Returns the side they held, if any.
    pub fn remove(&mut self, id: &ParticipantId) -> Option<Side> {
        self.participants.retain(|p| &p.id != id);
        let side = self.side_of(id)?;
        self.seats[side] = None;
        Some(side)
    }

    #[must_use]
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the room can lock: unlocked with at least two participants.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.locked && self.participants.len() >= 2
    }

    /// Mode requested by the earliest participant that asked for one.
    #[must_use]
    pub fn requested_mode(&self) -> MatchMode {
        self.participants.iter().find_map(|p| p.mode).unwrap_or_default()
    }

    /// Seat the first two participants. `swap` puts the second joiner in player 1.
    ///
    /// Returns the seated participants, or `None` if the room is not ready.
    pub fn lock(&mut self, swap: bool) -> Option<SideMap<Participant>> {
        if !self.is_ready() {
            return None;
        }
        let (first, second) = (self.participants[0].clone(), self.participants[1].clone());
        let (p1, p2) = if swap { (second, first) } else { (first, second) };
        self.seats = SideMap { player1: Some(p1.id.clone()), player2: Some(p2.id.clone()) };
        self.locked = true;
        Some(SideMap { player1: p1, player2: p2 })
    }

    #[must_use]
    pub fn side_of(&self, id: &ParticipantId) -> Option<Side> {
        self.seats.iter().find(|(_, p)| p.as_ref() == Some(id)).map(|(side, _)| side)
    }

    #[must_use]
    pub fn seat_of(&self, id: &ParticipantId) -> Seat {
        self.side_of(id).map_or(Seat::Spectator, Seat::from)
    }

    #[must_use]
    pub fn seated(&self, side: Side) -> Option<&ParticipantId> {
        self.seats[side].as_ref()
    }
}
