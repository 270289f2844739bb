//! Match state: the per-room aggregate every request reads and mutates.
//!
//! ## Ownership
//!
//! `MatchState` exclusively owns its tables (tokens, characters, walls,
//! auras, turn-state, energy, control). The board is immutable and shared.
//!
//! ## Drafts
//!
//! All tables are `im` persistent structures, so cloning the whole state is
//! O(1). The engine applies each request to a clone and only swaps it in on
//! success, which makes every request all-or-nothing.
//!
//! ## Determinism
//!
//! `OrdMap` iteration is sorted by key, so every "first matching ally" or
//! "for each character" pass visits characters in id order.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

use crate::board::{Board, TileId};
use crate::control::ControlState;
use crate::effects::AuraPulse;
use crate::energy::EnergyPools;
use crate::status::StatusBucket;

use super::config::{Kit, MatchConfig};
use super::entity::{CharacterId, Role, RoomId};
use super::rng::RandomSource;
use super::side::{Side, SideMap};

/// Scoring variant of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Standard,
    Control,
}

/// Board presence of a living character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub owner: Side,
    pub tile: TileId,
    pub has_moved_ever: bool,
}

/// A character and its combat state.
#[derive(Clone, Debug)]
pub struct Character {
    pub id: CharacterId,
    pub owner: Side,
    pub role: Role,
    pub name: String,
    /// Hero catalog id, if a hero was picked for this slot.
    pub hero: Option<String>,
    pub kit: Arc<Kit>,
    pub hp: i32,
    pub max_hp: i32,
    pub special_cooldown: u32,
    pub dead: bool,
    pub status: StatusBucket,
}

impl Character {
    fn from_kit(id: CharacterId, name: String, hero: Option<String>, kit: Kit) -> Self {
        Self {
            id,
            owner: id.side(),
            role: id.role(),
            name,
            hero,
            hp: kit.max_hp,
            max_hp: kit.max_hp,
            kit: Arc::new(kit),
            special_cooldown: 0,
            dead: false,
            status: StatusBucket::default(),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead && self.hp > 0
    }

    /// Back to full HP with a clean bucket and no cooldown.
    pub fn reset(&mut self) {
        self.hp = self.max_hp;
        self.dead = false;
        self.special_cooldown = 0;
        self.status.clear();
    }
}

/// Per-side turn bookkeeping, reset when that side's turn begins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    pub card_played: bool,
    pub used_movement: bool,
    pub used_action: bool,
    pub moved: OrdSet<CharacterId>,
    pub acted: OrdSet<CharacterId>,
    /// Extra steps for every move this turn.
    pub steps_bonus: u32,
    /// Extra steps for the next move only.
    pub steps_bonus_next: u32,
    /// Minimum path length of a move.
    pub min_steps: u32,
    /// Extra range for the next action only.
    pub range_bonus_next: u32,
}

/// Timed healing zone owned by one side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealAura {
    pub owner: Side,
    pub center: TileId,
    pub tiles: SmallVec<[TileId; 7]>,
    pub remaining: u32,
    pub center_heal: i32,
    pub petal_heal: i32,
    pub pulse: AuraPulse,
}

/// Countdown per side on a layered aura tile; zero means no layer.
pub type AuraLayers = SideMap<u32>;

/// The per-room aggregate.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub room: RoomId,
    pub mode: MatchMode,
    pub board: Arc<Board>,
    pub config: Arc<MatchConfig>,
    pub tokens: OrdMap<CharacterId, Token>,
    pub characters: OrdMap<CharacterId, Character>,
    /// Impassable walls with remaining turn ends.
    pub walls: OrdMap<TileId, u32>,
    /// Layered aura centres.
    pub aura_walls: OrdMap<TileId, AuraLayers>,
    /// Layered aura rings.
    pub aura_rings: OrdMap<TileId, AuraLayers>,
    pub heal_auras: Vector<HealAura>,
    pub turn: SideMap<TurnState>,
    pub current: Side,
    /// Increments after player 2's turn; drives energy income.
    pub round: u32,
    pub energy: EnergyPools,
    pub control: Option<ControlState>,
    pub respawn_queue: SideMap<Vector<CharacterId>>,
    pub last_discard: SideMap<Option<String>>,
    pub player_names: SideMap<Option<String>>,
    pub background: Option<String>,
    pub winner: Option<Side>,
    pub rng: Box<dyn RandomSource>,
}

impl MatchState {
    /// Fresh state: class kits, tokens on their spawns, empty pools.
    #[must_use]
    pub fn new(room: RoomId, mode: MatchMode, config: Arc<MatchConfig>, mut rng: Box<dyn RandomSource>) -> Self {
        let board = Arc::new(Board::new(config.board.clone()));
        let characters = CharacterId::all()
            .map(|id| {
                let kit = config.roster.kit(id.role(), None);
                (id, Character::from_kit(id, default_name(id.role()).to_string(), None, kit))
            })
            .collect();
        let background = (!config.backgrounds.is_empty())
            .then(|| config.backgrounds[rng.pick(config.backgrounds.len())].clone());
        let energy = EnergyPools::new(config.rules.energy.max);

        let mut state = Self {
            room,
            mode,
            board,
            tokens: OrdMap::new(),
            characters,
            walls: OrdMap::new(),
            aura_walls: OrdMap::new(),
            aura_rings: OrdMap::new(),
            heal_auras: Vector::new(),
            turn: SideMap::default(),
            current: Side::Player1,
            round: 1,
            energy,
            control: None,
            respawn_queue: SideMap::default(),
            last_discard: SideMap::default(),
            player_names: SideMap::default(),
            background,
            winner: None,
            rng,
            config,
        };
        state.set_mode(mode);
        state
    }

    /// Switch scoring mode and put every living token on that mode's spawn.
    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
        self.control = match mode {
            MatchMode::Standard => None,
            MatchMode::Control => Some(ControlState::new(&self.board, &self.config.rules.control)),
        };
        let spawns = match mode {
            MatchMode::Standard => &self.config.rules.spawns,
            MatchMode::Control => &self.config.rules.control.spawns,
        };
        self.tokens = self
            .characters
            .values()
            .filter(|c| !c.dead)
            .filter_map(|c| {
                let tile = *spawns.get(&c.id)?;
                Some((c.id, Token { owner: c.owner, tile, has_moved_ever: false }))
            })
            .collect();
    }

    /// Give a character a new kit (hero pick) and reset it to full HP.
    pub fn equip(&mut self, id: CharacterId, hero: Option<(&str, &str)>, kit: Kit) {
        let name = hero.map_or_else(|| default_name(id.role()).to_string(), |(_, n)| n.to_string());
        let hero_id = hero.map(|(h, _)| h.to_string());
        self.characters.insert(id, Character::from_kit(id, name, hero_id, kit));
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    #[must_use]
    pub fn token(&self, id: CharacterId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Character standing on `tile`, if any.
    #[must_use]
    pub fn occupant(&self, tile: TileId) -> Option<CharacterId> {
        self.tokens.iter().find(|(_, t)| t.tile == tile).map(|(id, _)| *id)
    }

    #[must_use]
    pub fn is_occupied(&self, tile: TileId) -> bool {
        self.occupant(tile).is_some()
    }

    #[must_use]
    pub fn is_walled(&self, tile: TileId) -> bool {
        self.walls.contains_key(&tile)
    }

    /// Ids of a side's characters that are on the board.
    pub fn living(&self, side: Side) -> impl Iterator<Item = CharacterId> + '_ {
        self.tokens
            .iter()
            .filter(move |(_, t)| t.owner == side)
            .map(|(id, _)| *id)
    }

    /// Path distance between tiles with walls as the only blockers.
    #[must_use]
    pub fn wall_distance(&self, from: TileId, to: TileId) -> Option<u32> {
        self.board.distance(from, to, |t| self.walls.contains_key(&t))
    }

    /// Path distance avoiding walls and every occupied tile.
    #[must_use]
    pub fn open_distance(&self, from: TileId, to: TileId) -> Option<u32> {
        let occupied: OrdSet<TileId> = self.tokens.values().map(|t| t.tile).collect();
        self.board
            .distance(from, to, |t| self.walls.contains_key(&t) || occupied.contains(&t))
    }
}

/// Display name for a slot with no hero.
#[must_use]
pub const fn default_name(role: Role) -> &'static str {
    match role {
        Role::Tank => "Tank",
        Role::Dps1 => "DPS1",
        Role::Dps2 => "DPS2",
        Role::Support => "Support",
    }
}
