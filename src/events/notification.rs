//! Outbound notifications.
//!
//! Each variant serializes as `{"event": <wire name>, "data": <payload>}`
//! with the payload field names clients already consume.

use serde::{Deserialize, Serialize};

use crate::board::TileId;
use crate::core::{CharacterId, Seat, Side, SideMap};

use super::snapshot::FullState;

/// Which ability slot produced an `abilityUsed` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Primary,
    Special,
}

/// Direction of an HP change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HpChange {
    Dmg,
    Heal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub id: CharacterId,
    pub owner: Side,
    pub to_tile: TileId,
    pub captured_id: Option<CharacterId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityUsed {
    pub kind: AbilityKind,
    pub source_id: CharacterId,
    pub target_id: Option<CharacterId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<CharacterId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlayed {
    #[serde(rename = "type")]
    pub card: String,
    pub who: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileId>,
}

impl CardPlayed {
    #[must_use]
    pub fn new(card: impl Into<String>, who: Side) -> Self {
        Self { card: card.into(), who, source_id: None, target_id: None, tile: None }
    }

    #[must_use]
    pub fn with_source(mut self, id: Option<CharacterId>) -> Self {
        self.source_id = id;
        self
    }

    #[must_use]
    pub fn with_target(mut self, id: Option<CharacterId>) -> Self {
        self.target_id = id;
        self
    }

    #[must_use]
    pub fn with_tile(mut self, tile: Option<TileId>) -> Self {
        self.tile = tile;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRevealed {
    pub who: Side,
    #[serde(rename = "type")]
    pub card: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpUpdate {
    pub id: CharacterId,
    pub hp: i32,
    pub prev: i32,
    #[serde(rename = "type")]
    pub change: HpChange,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDied {
    pub id: CharacterId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respawned {
    pub id: CharacterId,
    pub tile: TileId,
    pub owner: Side,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    pub id: CharacterId,
    pub roll: u32,
    pub success: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWon {
    pub winner: Side,
    pub scores: SideMap<u32>,
    pub round: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: Side,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidMove {
    pub id: Option<CharacterId>,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientEnergy {
    pub card: String,
    pub have: u32,
    pub required: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroesInvalid {
    pub reason: String,
}

/// Everything the engine tells clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Notification {
    #[serde(rename = "fullState")]
    FullState(Box<FullState>),
    #[serde(rename = "assignRole")]
    AssignRole(Seat),
    #[serde(rename = "heroes:invalid")]
    HeroesInvalid(HeroesInvalid),
    #[serde(rename = "move")]
    Move(MoveEvent),
    #[serde(rename = "abilityUsed")]
    AbilityUsed(AbilityUsed),
    #[serde(rename = "cardPlayed")]
    CardPlayed(CardPlayed),
    #[serde(rename = "cardRevealed")]
    CardRevealed(CardRevealed),
    #[serde(rename = "hpUpdate")]
    HpUpdate(HpUpdate),
    #[serde(rename = "unitDied")]
    UnitDied(UnitDied),
    #[serde(rename = "respawn")]
    Respawn(Respawned),
    #[serde(rename = "savingThrow")]
    SavingThrow(SavingThrow),
    #[serde(rename = "roundWon")]
    RoundWon(RoundWon),
    #[serde(rename = "gameOver")]
    GameOver(GameOver),
    #[serde(rename = "nextTurn")]
    NextTurn(Side),
    #[serde(rename = "invalidMove")]
    InvalidMove(InvalidMove),
    #[serde(rename = "insufficientEnergy")]
    InsufficientEnergy(InsufficientEnergy),
}

impl Notification {
    /// Wire event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Notification::FullState(_) => "fullState",
            Notification::AssignRole(_) => "assignRole",
            Notification::HeroesInvalid(_) => "heroes:invalid",
            Notification::Move(_) => "move",
            Notification::AbilityUsed(_) => "abilityUsed",
            Notification::CardPlayed(_) => "cardPlayed",
            Notification::CardRevealed(_) => "cardRevealed",
            Notification::HpUpdate(_) => "hpUpdate",
            Notification::UnitDied(_) => "unitDied",
            Notification::Respawn(_) => "respawn",
            Notification::SavingThrow(_) => "savingThrow",
            Notification::RoundWon(_) => "roundWon",
            Notification::GameOver(_) => "gameOver",
            Notification::NextTurn(_) => "nextTurn",
            Notification::InvalidMove(_) => "invalidMove",
            Notification::InsufficientEnergy(_) => "insufficientEnergy",
        }
    }

    /// JSON payload without the envelope, as a transport would emit it.
    pub fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        Ok(value
            .get_mut("data")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_of_move() {
        let n = Notification::Move(MoveEvent {
            id: "P1".parse().unwrap(),
            owner: Side::Player1,
            to_tile: "H1".parse().unwrap(),
            captured_id: None,
        });
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["event"], "move");
        assert_eq!(json["data"]["toTile"], "H1");
        assert_eq!(json["data"]["owner"], "player1");
        assert!(json["data"]["capturedId"].is_null());
        assert_eq!(n.name(), "move");
    }

    #[test]
    fn test_hp_update_type_field() {
        let n = Notification::HpUpdate(HpUpdate {
            id: "E1".parse().unwrap(),
            hp: 13,
            prev: 18,
            change: HpChange::Dmg,
        });
        let payload = n.payload_json().unwrap();
        assert_eq!(payload["type"], "dmg");
        assert_eq!(payload["prev"], 18);
    }

    #[test]
    fn test_names_match_serialized_tags() {
        let samples = vec![
            Notification::NextTurn(Side::Player2),
            Notification::AssignRole(Seat::Spectator),
            Notification::HeroesInvalid(HeroesInvalid { reason: "x".into() }),
            Notification::GameOver(GameOver { winner: Side::Player1 }),
        ];
        for n in samples {
            let json = serde_json::to_value(&n).unwrap();
            assert_eq!(json["event"], n.name());
        }
    }
}
