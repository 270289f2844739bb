//! Notifications, their audiences, and the per-request outbox.
//!
//! Handlers never talk to the transport. They push notifications into an
//! [`Outbox`]; the engine returns its contents only when the request
//! commits, so a rejected request emits nothing but its own feedback.

pub mod notification;
pub mod snapshot;

pub use notification::{
    AbilityKind, AbilityUsed, CardPlayed, CardRevealed, GameOver, HeroesInvalid, HpChange, HpUpdate,
    InsufficientEnergy, InvalidMove, MoveEvent, Notification, Respawned, RoundWon, SavingThrow, UnitDied,
};
pub use snapshot::{FullState, TokenView, CharacterView, TurnView};

use serde::{Deserialize, Serialize};

use crate::core::ParticipantId;

/// Who receives a notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "to", content = "id")]
pub enum Audience {
    /// Everyone in the room.
    Room,
    /// A single participant.
    Participant(ParticipantId),
}

/// A notification with its audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub audience: Audience,
    pub notification: Notification,
}

impl Envelope {
    #[must_use]
    pub fn room(notification: Notification) -> Self {
        Self { audience: Audience::Room, notification }
    }

    #[must_use]
    pub fn to(participant: ParticipantId, notification: Notification) -> Self {
        Self { audience: Audience::Participant(participant), notification }
    }
}

/// Ordered buffer of notifications produced while handling one request.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    envelopes: Vec<Envelope>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a room-wide notification.
    pub fn broadcast(&mut self, notification: Notification) {
        self.envelopes.push(Envelope::room(notification));
    }

    /// Queue a notification for one participant.
    pub fn send_to(&mut self, participant: &ParticipantId, notification: Notification) {
        self.envelopes.push(Envelope::to(participant.clone(), notification));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.envelopes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Envelope> {
        self.envelopes
    }
}
