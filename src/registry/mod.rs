//! Registry of live matches, one per room.
//!
//! The room map sits behind a read-write lock and each match behind its own
//! mutex, so requests for different rooms never wait on each other. Every
//! envelope a match produces is also published on the room's broadcast
//! channel for transports and observers.

use std::sync::{Arc, Mutex, RwLock};

use rustc_hash::FxHashMap;
use tokio::sync::broadcast;

use crate::core::{MatchConfig, ParticipantId, Request, RoomId};
use crate::error::{RegistryError, RegistryResult};
use crate::events::Envelope;
use crate::rules::Match;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct Room {
    game: Arc<Mutex<Match>>,
    events: broadcast::Sender<Envelope>,
}

/// All matches hosted by one process.
#[derive(Debug)]
pub struct MatchRegistry {
    config: Arc<MatchConfig>,
    seed: u64,
    rooms: RwLock<FxHashMap<RoomId, Room>>,
}

impl MatchRegistry {
    /// Registry whose matches derive their seeds from `seed` and their room id.
    #[must_use]
    pub fn new(config: Arc<MatchConfig>, seed: u64) -> Self {
        Self { config, seed, rooms: RwLock::new(FxHashMap::default()) }
    }

    /// Join `room`, creating its match on first use.
    pub fn join(&self, room: &RoomId, who: &ParticipantId, request: Request) -> RegistryResult<Vec<Envelope>> {
        self.ensure(room)?;
        self.dispatch(room, who, request)
    }

    /// Route a request to an existing room's match.
    pub fn dispatch(&self, room: &RoomId, who: &ParticipantId, request: Request) -> RegistryResult<Vec<Envelope>> {
        let (game, events) = self.room(room)?;
        // publish under the match lock so subscribers see requests in commit order
        let mut game = game.lock().map_err(|_| poisoned(room))?;
        let envelopes = game.dispatch(who, request);
        publish(&events, &envelopes);
        Ok(envelopes)
    }

    /// A participant's connection closed.
    pub fn disconnect(&self, room: &RoomId, who: &ParticipantId) -> RegistryResult<Vec<Envelope>> {
        let (game, events) = self.room(room)?;
        let mut game = game.lock().map_err(|_| poisoned(room))?;
        let envelopes = game.disconnect(who);
        publish(&events, &envelopes);
        Ok(envelopes)
    }

    /// Drop a room's match. Returns whether it existed.
    pub fn discard(&self, room: &RoomId) -> RegistryResult<bool> {
        let mut rooms = self.rooms.write().map_err(|_| poisoned(room))?;
        let existed = rooms.remove(room).is_some();
        if existed {
            tracing::info!(%room, "match discarded");
        }
        Ok(existed)
    }

    /// Receive every envelope the room's match produces from now on.
    pub fn subscribe(&self, room: &RoomId) -> RegistryResult<broadcast::Receiver<Envelope>> {
        let (_, events) = self.room(room)?;
        Ok(events.subscribe())
    }

    #[must_use]
    pub fn contains(&self, room: &RoomId) -> bool {
        self.rooms.read().map(|rooms| rooms.contains_key(room)).unwrap_or(false)
    }

    /// Shared handle to a room's match.
    pub fn get(&self, room: &RoomId) -> RegistryResult<Arc<Mutex<Match>>> {
        self.room(room).map(|(game, _)| game)
    }

    pub fn len(&self) -> usize {
        self.rooms.read().map(|rooms| rooms.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure(&self, room: &RoomId) -> RegistryResult<()> {
        if self.contains(room) {
            return Ok(());
        }
        let mut rooms = self.rooms.write().map_err(|_| poisoned(room))?;
        rooms.entry(room.clone()).or_insert_with(|| Room {
            game: Arc::new(Mutex::new(Match::new(room.clone(), self.config.clone(), self.seed))),
            events: broadcast::channel(CHANNEL_CAPACITY).0,
        });
        Ok(())
    }

    fn room(&self, room: &RoomId) -> RegistryResult<(Arc<Mutex<Match>>, broadcast::Sender<Envelope>)> {
        let rooms = self.rooms.read().map_err(|_| poisoned(room))?;
        let entry = rooms.get(room).ok_or_else(|| RegistryError::MatchNotFound(room.clone()))?;
        Ok((entry.game.clone(), entry.events.clone()))
    }
}

fn poisoned(room: &RoomId) -> RegistryError {
    tracing::warn!(%room, "lock poisoned");
    RegistryError::LockPoisoned
}

/// Sending fails only when nobody is subscribed, which is fine.
fn publish(events: &broadcast::Sender<Envelope>, envelopes: &[Envelope]) {
    for envelope in envelopes {
        let _ = events.send(envelope.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Notification;

    fn join(room: &str) -> Request {
        Request::Join { room: RoomId::new(room), name: None, heroes: Vec::new(), mode: None }
    }

    #[test]
    fn test_rooms_are_created_lazily() {
        let registry = MatchRegistry::new(Arc::new(MatchConfig::default()), 7);
        let room = RoomId::new("r1");
        assert!(!registry.contains(&room));
        assert!(matches!(
            registry.dispatch(&room, &ParticipantId::new("a"), Request::EndTurn),
            Err(RegistryError::MatchNotFound(_))
        ));

        registry.join(&room, &ParticipantId::new("a"), join("r1")).unwrap();
        assert!(registry.contains(&room));
        assert_eq!(registry.len(), 1);
        assert!(registry.discard(&room).unwrap());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscribers_see_lock() {
        let registry = MatchRegistry::new(Arc::new(MatchConfig::default()), 7);
        let room = RoomId::new("r2");
        registry.join(&room, &ParticipantId::new("a"), join("r2")).unwrap();
        let mut rx = registry.subscribe(&room).unwrap();
        let sent = registry.join(&room, &ParticipantId::new("b"), join("r2")).unwrap();

        let mut seen = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            seen.push(envelope);
        }
        assert_eq!(seen, sent);
        assert!(seen.iter().any(|e| e.notification.name() == "assignRole"));
    }

    #[test]
    fn test_same_seed_same_seats() {
        let seats = |seed| {
            let registry = MatchRegistry::new(Arc::new(MatchConfig::default()), seed);
            let room = RoomId::new("r3");
            registry.join(&room, &ParticipantId::new("a"), join("r3")).unwrap();
            registry.join(&room, &ParticipantId::new("b"), join("r3")).unwrap();
            let game = registry.get(&room).unwrap();
            let seat = game.lock().unwrap().seat_of(&ParticipantId::new("a"));
            seat
        };
        assert_eq!(seats(11), seats(11));
    }

    #[test]
    fn test_concurrent_requests_publish_in_commit_order() {
        let registry = MatchRegistry::new(Arc::new(MatchConfig::default()), 3);
        let room = RoomId::new("r4");
        for who in ["a", "b"] {
            registry.join(&room, &ParticipantId::new(who), join("r4")).unwrap();
        }
        let mut rx = registry.subscribe(&room).unwrap();

        std::thread::scope(|scope| {
            for who in ["a", "b"] {
                let (registry, room) = (&registry, &room);
                scope.spawn(move || {
                    for _ in 0..10 {
                        registry.dispatch(room, &ParticipantId::new(who), Request::EndTurn).unwrap();
                    }
                });
            }
        });

        let mut last = None;
        while let Ok(envelope) = rx.try_recv() {
            if let Notification::FullState(state) = envelope.notification {
                last = Some(*state);
            }
        }
        let game = registry.get(&room).unwrap();
        let current = game.lock().unwrap().snapshot();
        assert_eq!(last, Some(current));
    }
}
