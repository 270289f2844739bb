//! Match configuration.
//!
//! Everything a match treats as tuning data lives here: board geometry,
//! rule constants, the energy cost table and the roster of class kits and
//! hero overrides. The engine never hardcodes these numbers.
//!
//! ## Loading
//!
//! `MatchConfig::default()` reproduces the stock game. A host can ship its
//! own table as JSON and load it with [`MatchConfig::from_json`]; missing
//! sections fall back to defaults.
//!
//! ```
//! use hex_tactics::core::MatchConfig;
//!
//! let config = MatchConfig::from_json(r#"{ "costs": { "Fireball": 5 } }"#).unwrap();
//! assert_eq!(config.costs.cost("Fireball"), 5);
//! assert_eq!(config.costs.cost("Wall"), 0);
//! assert_eq!(config.rules.energy.max, 10);
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::{BoardLayout, TileId};
use crate::effects::{Affects, AuraPulse, Effect, LineShape, RangeRule, Targeting};
use crate::status::StatusEffect;

use super::entity::{Archetype, CharacterId, Role};

/// Errors loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Abilities and kits
// =============================================================================

/// Data description of one ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    /// Display name, also recorded as the side's last discard.
    pub name: String,
    pub effect: Effect,
    #[serde(default)]
    pub target: Targeting,
    /// `None` means unlimited range.
    #[serde(default)]
    pub range: Option<RangeRule>,
    /// Key into the cost table; `None` costs nothing.
    #[serde(default)]
    pub cost: Option<String>,
    /// Turns before a special can be used again.
    #[serde(default)]
    pub cooldown: u32,
    /// Only usable after the character moved this turn.
    #[serde(default)]
    pub requires_moved: bool,
    /// Display name while the user is transformed.
    #[serde(default)]
    pub transformed_name: Option<String>,
}

impl AbilityDef {
    /// Enemy-targeted ability with no range limit, cost or cooldown.
    #[must_use]
    pub fn new(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            name: name.into(),
            effect,
            target: Targeting::Enemy,
            range: None,
            cost: None,
            cooldown: 0,
            requires_moved: false,
            transformed_name: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Targeting) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: RangeRule) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, key: impl Into<String>) -> Self {
        self.cost = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown = turns;
        self
    }

    #[must_use]
    pub fn requiring_move(mut self) -> Self {
        self.requires_moved = true;
        self
    }

    #[must_use]
    pub fn with_transformed_name(mut self, name: impl Into<String>) -> Self {
        self.transformed_name = Some(name.into());
        self
    }
}

/// Passive hero traits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    /// Roll to survive a killing blow.
    pub saving_throw: bool,
    /// HP restored to self at the end of the owner's turn.
    pub end_of_turn_heal: i32,
}

/// Stats and abilities a character fights with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    pub max_hp: i32,
    pub primary: AbilityDef,
    pub special: AbilityDef,
    #[serde(default)]
    pub traits: Traits,
}

/// Default kit per role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassKits {
    pub tank: Kit,
    pub dps1: Kit,
    pub dps2: Kit,
    pub support: Kit,
}

impl ClassKits {
    #[must_use]
    pub fn get(&self, role: Role) -> &Kit {
        match role {
            Role::Tank => &self.tank,
            Role::Dps1 => &self.dps1,
            Role::Dps2 => &self.dps2,
            Role::Support => &self.support,
        }
    }
}

/// Hero catalog entry. Unset fields fall back to the class kit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroDef {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub primary: Option<AbilityDef>,
    #[serde(default)]
    pub special: Option<AbilityDef>,
    #[serde(default)]
    pub traits: Traits,
}

/// Why a hero pick was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("unknown hero: {0}")]
    UnknownHero(String),

    #[error("Pick 1 Tank, 2 DPS, 1 Support")]
    Composition,
}

/// Class kits plus the hero catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTable {
    pub classes: ClassKits,
    pub heroes: Vec<HeroDef>,
}

impl RosterTable {
    /// Find a hero by catalog id or display name (case-insensitive).
    #[must_use]
    pub fn hero(&self, key: &str) -> Option<&HeroDef> {
        self.heroes
            .iter()
            .find(|h| h.id.eq_ignore_ascii_case(key) || h.name.eq_ignore_ascii_case(key))
    }

    /// Kit for a role, with an optional hero override applied.
    #[must_use]
    pub fn kit(&self, role: Role, hero: Option<&HeroDef>) -> Kit {
        let base = self.classes.get(role);
        match hero {
            None => base.clone(),
            Some(h) => Kit {
                max_hp: h.max_hp.unwrap_or(base.max_hp),
                primary: h.primary.clone().unwrap_or_else(|| base.primary.clone()),
                special: h.special.clone().unwrap_or_else(|| base.special.clone()),
                traits: h.traits.clone(),
            },
        }
    }

    /// Resolve four picks into slot order (Tank, DPS, DPS, Support).
    ///
    /// An empty pick list is valid and leaves every slot on its class kit.
    pub fn assign(&self, picks: &[String]) -> Result<[Option<&HeroDef>; 4], RosterError> {
        if picks.is_empty() {
            return Ok([None; 4]);
        }
        let resolved = picks
            .iter()
            .map(|p| self.hero(p).ok_or_else(|| RosterError::UnknownHero(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let of = |a: Archetype| resolved.iter().copied().filter(move |h| h.archetype == a);
        let tanks: Vec<_> = of(Archetype::Tank).collect();
        let dps: Vec<_> = of(Archetype::Dps).collect();
        let supports: Vec<_> = of(Archetype::Support).collect();
        if resolved.len() != 4 || tanks.len() != 1 || dps.len() != 2 || supports.len() != 1 {
            return Err(RosterError::Composition);
        }
        Ok([Some(tanks[0]), Some(dps[0]), Some(dps[1]), Some(supports[0])])
    }
}

impl Default for RosterTable {
    fn default() -> Self {
        let within = RangeRule::within;
        let classes = ClassKits {
            tank: Kit {
                max_hp: 18,
                primary: AbilityDef::new("Shield Bash", Effect::damage(3)).with_range(within(1)),
                special: AbilityDef::new("Hammer Slam", Effect::damage(5))
                    .with_range(within(1))
                    .with_cooldown(3),
                traits: Traits::default(),
            },
            dps1: Kit {
                max_hp: 8,
                primary: AbilityDef::new("Fire Bolt", Effect::damage(3)).with_range(within(2)),
                special: AbilityDef::new("Dragon's Fury", Effect::damage(4))
                    .with_range(within(2))
                    .with_cooldown(4),
                traits: Traits::default(),
            },
            dps2: Kit {
                max_hp: 11,
                primary: AbilityDef::new("Dagger Thrust", Effect::damage(3)).with_range(within(1)),
                special: AbilityDef::new("Sneak Attack", Effect::damage(5))
                    .with_range(within(1))
                    .with_cooldown(3)
                    .requiring_move(),
                traits: Traits::default(),
            },
            support: Kit {
                max_hp: 10,
                primary: AbilityDef::new("Mend", Effect::heal(2))
                    .with_target(Targeting::Ally)
                    .with_range(within(2)),
                special: AbilityDef::new("Healing Bloom", Effect::heal(4))
                    .with_target(Targeting::Ally)
                    .with_range(within(2))
                    .with_cooldown(3),
                traits: Traits::default(),
            },
        };

        let hero = |id: &str, name: &str, archetype| HeroDef {
            id: id.to_string(),
            name: name.to_string(),
            archetype,
            max_hp: None,
            primary: None,
            special: None,
            traits: Traits::default(),
        };

        let heroes = vec![
            HeroDef {
                max_hp: Some(18),
                primary: Some(AbilityDef::new("Pin Cushion", Effect::damage(4)).with_range(within(1))),
                special: Some(
                    AbilityDef::new("Voodoo Doll", Effect::status(StatusEffect::Redirect { turns: 2 }))
                        .with_target(Targeting::SelfOnly)
                        .with_cost("VoodooDoll"),
                ),
                ..hero("voodoo", "Voodoo", Archetype::Tank)
            },
            HeroDef {
                max_hp: Some(15),
                primary: Some(
                    AbilityDef::new(
                        "Reverse Polarity",
                        Effect::Area { radius: 1, affects: Affects::Enemies, effects: vec![Effect::damage(2)] },
                    )
                    .with_target(Targeting::SelfOnly),
                ),
                special: Some(
                    AbilityDef::new("Polar Attraction", Effect::Polar)
                        .with_target(Targeting::SelfOnly)
                        .with_range(within(2))
                        .with_cost("PolarAttraction"),
                ),
                ..hero("loadstone", "Loadstone", Archetype::Tank)
            },
            HeroDef {
                max_hp: Some(13),
                primary: Some(
                    AbilityDef::new("Paw Swipe", Effect::damage(3))
                        .with_range(within(1))
                        .with_transformed_name("Bear Claw"),
                ),
                special: Some(
                    AbilityDef::new(
                        "Transform",
                        Effect::status(StatusEffect::Transform {
                            turns: 3,
                            mitigation_pct: 50,
                            extra_moves: 1,
                            extra_attack: 2,
                        }),
                    )
                    .with_target(Targeting::SelfOnly)
                    .with_cost("Transform"),
                ),
                ..hero("little_bear", "Little Bear", Archetype::Tank)
            },
            HeroDef {
                max_hp: Some(8),
                primary: Some(AbilityDef::new("True Shot", Effect::damage(5)).with_range(RangeRule::exactly(3))),
                special: Some(
                    AbilityDef::new(
                        "FMJ",
                        Effect::Line { damage: 5, shape: LineShape::Segment, length: Some(4) },
                    )
                    .with_target(Targeting::Tile)
                    .with_range(RangeRule::within(4).through_walls())
                    .with_cost("FMJ"),
                ),
                ..hero("aimbot", "Aimbot", Archetype::Dps)
            },
            HeroDef {
                max_hp: Some(11),
                primary: Some(AbilityDef::new("Sleight of Hand", Effect::damage(4)).with_range(within(1))),
                special: Some(
                    AbilityDef::new("Swap", Effect::SwapPositions)
                        .with_target(Targeting::AnyCharacter)
                        .with_range(RangeRule::within(99))
                        .with_cost("Swap"),
                ),
                ..hero("trickster", "Trickster", Archetype::Dps)
            },
            HeroDef {
                max_hp: Some(12),
                primary: Some(
                    AbilityDef::new("1D6", Effect::DiceDamage { sides: 6, bonus: 0 }).with_range(within(2)),
                ),
                special: Some(
                    AbilityDef::new(
                        "Skill Check",
                        Effect::status(StatusEffect::PendingBuff { attack: 1, moves: 1 }),
                    )
                    .with_target(Targeting::Ally)
                    .with_range(within(2))
                    .with_cost("SkillCheck"),
                ),
                traits: Traits { saving_throw: true, end_of_turn_heal: 0 },
                ..hero("dungeon_master", "Dungeon Master", Archetype::Dps)
            },
            HeroDef {
                special: Some(
                    AbilityDef::new(
                        "Healing Blossom",
                        Effect::HealAura { center_heal: 2, petal_heal: 1, duration: 2, pulse: AuraPulse::EndOfTurn },
                    )
                    .with_target(Targeting::Tile)
                    .with_cost("HealingPetal"),
                ),
                ..hero("death_blossom", "Death Blossom", Archetype::Support)
            },
            HeroDef {
                max_hp: Some(12),
                primary: Some(
                    AbilityDef::new("Blood Donation", Effect::TapHeal { amount: 1 })
                        .with_target(Targeting::Ally)
                        .with_range(within(1)),
                ),
                special: Some(
                    AbilityDef::new("Replenish", Effect::heal(5))
                        .with_target(Targeting::SelfOnly)
                        .with_cost("Replenish"),
                ),
                traits: Traits { saving_throw: false, end_of_turn_heal: 1 },
                ..hero("don_atore", "Don Atore", Archetype::Support)
            },
        ];

        Self { classes, heroes }
    }
}

// =============================================================================
// Costs
// =============================================================================

/// Energy cost per card or ability key. Unknown keys cost nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable(pub BTreeMap<String, u32>);

impl CostTable {
    #[must_use]
    pub fn cost(&self, key: &str) -> u32 {
        self.0.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn with_cost(mut self, key: impl Into<String>, cost: u32) -> Self {
        self.0.insert(key.into(), cost);
        self
    }
}

impl Default for CostTable {
    fn default() -> Self {
        let table = [
            ("SkillCheck", 3),
            ("Cleanse", 3),
            ("Siphon", 2),
            ("Fireball", 4),
            ("Entangle", 2),
            ("IronSkin", 3),
            ("Sprint", 2),
            ("SideStep", 2),
            ("Wall", 1),
            ("Shatter", 1),
            ("Swap", 4),
            ("FMJ", 6),
            ("VoodooDoll", 3),
            ("PolarAttraction", 4),
            ("HealingPetal", 4),
            ("Transform", 5),
            ("Replenish", 5),
            ("InvisibilityPotion", 2),
            ("Scope", 2),
        ];
        Self(table.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

// =============================================================================
// Rule constants
// =============================================================================

/// Income granted while the round counter is at most `through_round`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBand {
    /// Inclusive upper round; `None` covers every later round.
    pub through_round: Option<u32>,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyRules {
    pub max: u32,
    pub income: Vec<IncomeBand>,
}

impl Default for EnergyRules {
    fn default() -> Self {
        let band = |through_round, amount| IncomeBand { through_round, amount };
        Self {
            max: 10,
            income: vec![band(Some(2), 1), band(Some(5), 2), band(Some(8), 3), band(None, 4)],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRules {
    /// Steps on a token's first ever move.
    pub first_move_steps: u32,
    /// Steps on every later move.
    pub steps: u32,
}

impl Default for MovementRules {
    fn default() -> Self {
        Self { first_move_steps: 2, steps: 1 }
    }
}

/// Layered aura wall placed by the BlossomWall card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraWallRules {
    pub ttl: u32,
    pub center_heal: i32,
    pub ring_heal: i32,
}

impl Default for AuraWallRules {
    fn default() -> Self {
        Self { ttl: 2, center_heal: 2, ring_heal: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrowRules {
    pub sides: u32,
    pub success_on: u32,
    pub restore_hp: i32,
}

impl Default for SavingThrowRules {
    fn default() -> Self {
        Self { sides: 3, success_on: 3, restore_hp: 3 }
    }
}

/// Parameters of the resource cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRules {
    pub fireball: StatusEffect,
    pub entangle: StatusEffect,
    pub iron_skin: StatusEffect,
    pub invisibility: StatusEffect,
    pub siphon_drain: u32,
    pub siphon_gain: u32,
    pub sprint_steps: u32,
    pub dash_steps: u32,
    pub blink_min_steps: u32,
    pub teleport_range: u32,
    pub scope_range: u32,
    pub wall_ttl: u32,
}

impl Default for CardRules {
    fn default() -> Self {
        Self {
            fireball: StatusEffect::Burn { per_tick: 2, turns: 3 },
            entangle: StatusEffect::Root { turns: 3 },
            iron_skin: StatusEffect::IronSkin { reduce: 2, turns: 2 },
            invisibility: StatusEffect::Invisible { turns: 2 },
            siphon_drain: 3,
            siphon_gain: 1,
            sprint_steps: 1,
            dash_steps: 2,
            blink_min_steps: 2,
            teleport_range: 3,
            scope_range: 1,
            wall_ttl: 8,
        }
    }
}

/// Control-point mode parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRules {
    pub anchor: TileId,
    pub anchor_points: u32,
    pub tile_points: u32,
    /// Scoring tiles taken from the anchor's neighbours.
    pub max_tiles: usize,
    pub round_target: u32,
    pub rounds_to_win: u32,
    pub respawn_radius: u32,
    pub spawns: BTreeMap<CharacterId, TileId>,
}

impl Default for ControlRules {
    fn default() -> Self {
        Self {
            anchor: TileId::new(4, 0),
            anchor_points: 2,
            tile_points: 1,
            max_tiles: 3,
            round_target: 10,
            rounds_to_win: 3,
            respawn_radius: 3,
            spawns: spawn_table(&[
                ("P1", "H4"),
                ("P2", "I4"),
                ("P3", "H5"),
                ("P4", "I3"),
                ("E1", "B4"),
                ("E2", "A4"),
                ("E3", "B5"),
                ("E4", "A3"),
            ]),
        }
    }
}

fn spawn_table(entries: &[(&str, &str)]) -> BTreeMap<CharacterId, TileId> {
    entries
        .iter()
        .filter_map(|(c, t)| Some((c.parse().ok()?, t.parse().ok()?)))
        .collect()
}

/// All rule constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConstants {
    pub energy: EnergyRules,
    pub movement: MovementRules,
    pub aura_wall: AuraWallRules,
    pub saving_throw: SavingThrowRules,
    pub cards: CardRules,
    pub control: ControlRules,
    /// Standard-mode starting tiles.
    pub spawns: BTreeMap<CharacterId, TileId>,
}

impl Default for RuleConstants {
    fn default() -> Self {
        Self {
            energy: EnergyRules::default(),
            movement: MovementRules::default(),
            aura_wall: AuraWallRules::default(),
            saving_throw: SavingThrowRules::default(),
            cards: CardRules::default(),
            control: ControlRules::default(),
            spawns: spawn_table(&[
                ("P1", "I1"),
                ("P2", "I2"),
                ("P3", "I3"),
                ("P4", "I4"),
                ("E1", "A1"),
                ("E2", "A2"),
                ("E3", "A3"),
                ("E4", "A4"),
            ]),
        }
    }
}

// =============================================================================
// Top level
// =============================================================================

/// Complete configuration for a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub board: BoardLayout,
    pub rules: RuleConstants,
    pub costs: CostTable,
    pub roster: RosterTable,
    /// Background images, one picked per match.
    pub backgrounds: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board: BoardLayout::default(),
            rules: RuleConstants::default(),
            costs: CostTable::default(),
            roster: RosterTable::default(),
            backgrounds: vec![
                "/assets/background_paper.png".to_string(),
                "/assets/background_meadow.png".to_string(),
            ],
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleConstants) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_costs(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    #[must_use]
    pub fn with_roster(mut self, roster: RosterTable) -> Self {
        self.roster = roster;
        self
    }

    #[must_use]
    pub fn with_backgrounds(mut self, backgrounds: Vec<String>) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.board.rows.is_empty() || self.board.rows.len() > 26 {
            return Err(ConfigError::Invalid("board needs 1..=26 rows".into()));
        }
        if self.rules.energy.max == 0 {
            return Err(ConfigError::Invalid("energy max must be positive".into()));
        }
        if self.rules.energy.income.is_empty() {
            return Err(ConfigError::Invalid("energy income needs at least one band".into()));
        }
        let mut seen = FxHashSet::default();
        for hero in &self.roster.heroes {
            if !seen.insert(hero.id.to_ascii_lowercase()) {
                return Err(ConfigError::Invalid(format!("duplicate hero id {}", hero.id)));
            }
        }
        for id in CharacterId::all() {
            if !self.rules.spawns.contains_key(&id) {
                return Err(ConfigError::Invalid(format!("no standard spawn for {id}")));
            }
            if !self.rules.control.spawns.contains_key(&id) {
                return Err(ConfigError::Invalid(format!("no control spawn for {id}")));
            }
        }
        Ok(())
    }
}
