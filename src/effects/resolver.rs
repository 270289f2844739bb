//! Effect resolution - executing effects on match state.
//!
//! The `EffectResolver` interprets the closed [`Effect`] union against a
//! draft `MatchState`. It owns the two HP paths every other component goes
//! through:
//!
//! - [`EffectResolver::apply_damage`]: redirect, mitigation, HP clamp,
//!   saving throw, death
//! - [`EffectResolver::apply_heal`]: clamp to max, no-op on the dead
//!
//! Legality (turn, ownership, range, energy) is checked by the caller
//! before resolution; the resolver only refuses effects whose target shape
//! is wrong for the effect.

use smallvec::SmallVec;

use crate::board::{angle_diff, TileId};
use crate::control::enqueue_respawn;
use crate::core::state::HealAura;
use crate::core::{CharacterId, MatchState, Side};
use crate::error::{ActionError, ActionResult};
use crate::events::{
    CardPlayed, HpChange, HpUpdate, MoveEvent, Notification, Outbox, SavingThrow, UnitDied,
};
use crate::rules::declare_winner;

use super::{Affects, Effect, LineShape, Target};

/// Caller-supplied parameters of one resolution.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext {
    pub actor: CharacterId,
    /// Effective reach (ability range plus one-shot bonus), for effects that search.
    pub reach: Option<u32>,
    /// Extra radius for area effects.
    pub range_bonus: u32,
}

impl ResolveContext {
    #[must_use]
    pub fn new(actor: CharacterId) -> Self {
        Self { actor, reach: None, range_bonus: 0 }
    }

    #[must_use]
    pub fn with_reach(mut self, reach: Option<u32>) -> Self {
        self.reach = reach;
        self
    }

    #[must_use]
    pub fn with_range_bonus(mut self, bonus: u32) -> Self {
        self.range_bonus = bonus;
        self
    }
}

/// What an effect touched, for the `abilityUsed` record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub hits: Vec<CharacterId>,
    pub tiles: Vec<TileId>,
    pub roll: Option<u32>,
}

/// Resolves effects on match state.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve one effect from `ctx.actor` at `target`.
    pub fn resolve(
        state: &mut MatchState,
        out: &mut Outbox,
        ctx: &ResolveContext,
        target: Target,
        effect: &Effect,
    ) -> ActionResult<Resolution> {
        let mut res = Resolution::default();

        match effect {
            Effect::Damage { amount } => {
                let id = character_at(state, target)?;
                Self::apply_damage(state, out, id, *amount);
                res.hits.push(id);
            }

            Effect::DiceDamage { sides, bonus } => {
                let id = character_at(state, target)?;
                let roll = state.rng.roll(*sides);
                Self::apply_damage(state, out, id, roll as i32 + bonus);
                res.hits.push(id);
                res.roll = Some(roll);
            }

            Effect::Heal { amount } => {
                let id = character_at(state, target)?;
                Self::apply_heal(state, out, id, *amount);
                res.hits.push(id);
            }

            Effect::TapHeal { amount } => {
                let id = character_at(state, target)?;
                if id == ctx.actor {
                    return Err(ActionError::InvalidTarget("cannot donate to self"));
                }
                let actor = state
                    .characters
                    .get_mut(&ctx.actor)
                    .ok_or(ActionError::NotOnBoard(ctx.actor))?;
                if actor.hp <= *amount {
                    return Err(ActionError::Requirement("not enough health to donate"));
                }
                let prev = actor.hp;
                actor.hp -= amount;
                out.broadcast(Notification::HpUpdate(HpUpdate {
                    id: ctx.actor,
                    hp: actor.hp,
                    prev,
                    change: HpChange::Dmg,
                }));
                Self::apply_heal(state, out, id, *amount);
                res.hits.push(id);
            }

            Effect::Cleanse => {
                let id = character_at(state, target)?;
                if let Some(c) = state.characters.get_mut(&id) {
                    c.status.clear();
                }
                res.hits.push(id);
            }

            Effect::Status { status } => {
                let id = character_at(state, target)?;
                if let Some(c) = state.characters.get_mut(&id) {
                    c.status.apply(*status);
                }
                res.hits.push(id);
            }

            Effect::Area { radius, affects, effects } => {
                let (_, side) = actor_position(state, ctx.actor)?;
                let center = tile_of(state, target)?;
                let tiles = state
                    .board
                    .area(center, radius + ctx.range_bonus, |t| state.walls.contains_key(&t));
                let victims: Vec<CharacterId> = tiles
                    .iter()
                    .filter_map(|t| state.occupant(*t))
                    .filter(|id| match affects {
                        Affects::Enemies => id.side() != side,
                        Affects::Allies => id.side() == side,
                        Affects::All => true,
                    })
                    .collect();
                for id in victims {
                    for nested in effects {
                        if state.tokens.contains_key(&id) {
                            let inner = Self::resolve(state, out, ctx, Target::Character(id), nested)?;
                            res.roll = res.roll.or(inner.roll);
                        }
                    }
                    res.hits.push(id);
                }
                res.tiles = tiles;
            }

            Effect::Line { damage, shape, length } => {
                let (from, side) = actor_position(state, ctx.actor)?;
                let to = tile_of(state, target)?;
                let mut path = match shape {
                    LineShape::Hex => state.board.hex_line(from, to),
                    LineShape::Segment => state.board.segment_line(from, to),
                };
                path.retain(|t| *t != from);
                if let Some(len) = length {
                    path.truncate(*len);
                }
                for tile in &path {
                    if let Some(id) = state.occupant(*tile).filter(|id| id.side() != side) {
                        Self::apply_damage(state, out, id, *damage);
                        res.hits.push(id);
                    }
                }
                res.tiles = path;
            }

            Effect::SwapPositions => {
                let id = character_at(state, target)?;
                if id == ctx.actor {
                    return Err(ActionError::InvalidTarget("cannot swap with self"));
                }
                let (a_tile, _) = actor_position(state, ctx.actor)?;
                let b_tile = state.token(id).ok_or(ActionError::NotOnBoard(id))?.tile;
                for (who, tile) in [(ctx.actor, b_tile), (id, a_tile)] {
                    if let Some(tok) = state.tokens.get_mut(&who) {
                        tok.tile = tile;
                        out.broadcast(Notification::Move(MoveEvent {
                            id: who,
                            owner: tok.owner,
                            to_tile: tile,
                            captured_id: None,
                        }));
                    }
                }
                res.hits.push(id);
                res.tiles = vec![a_tile, b_tile];
            }

            Effect::Polar => {
                res.hits = Self::pull_enemies(state, out, ctx)?;
            }

            Effect::HealAura { center_heal, petal_heal, duration, pulse } => {
                let center = tile_of(state, target)?;
                let owner = ctx.actor.side();
                let mut tiles: SmallVec<[TileId; 7]> = SmallVec::new();
                tiles.push(center);
                tiles.extend(state.board.neighbors(center).iter().copied());
                res.tiles = tiles.to_vec();
                state.heal_auras.push_back(HealAura {
                    owner,
                    center,
                    tiles,
                    remaining: *duration,
                    center_heal: *center_heal,
                    petal_heal: *petal_heal,
                    pulse: *pulse,
                });
            }
        }

        Ok(res)
    }

    /// Deal damage through redirect, mitigation, saving throw and death.
    ///
    /// Returns the HP actually removed. Damage to a dead or unknown
    /// character is a no-op.
    pub fn apply_damage(state: &mut MatchState, out: &mut Outbox, target: CharacterId, amount: i32) -> i32 {
        let target = redirect_target(state, target).unwrap_or(target);
        let saving = state.config.rules.saving_throw;

        let Some(c) = state.characters.get_mut(&target) else {
            return 0;
        };
        if c.dead {
            return 0;
        }
        let dealt = c.status.mitigate(amount);
        let prev = c.hp;
        c.hp = (prev - dealt).max(0);
        let hp = c.hp;
        let has_saving_throw = c.kit.traits.saving_throw;
        let owner = c.owner;
        tracing::debug!(room = %state.room, %target, amount, dealt, prev, hp, "damage");
        out.broadcast(Notification::HpUpdate(HpUpdate { id: target, hp, prev, change: HpChange::Dmg }));

        if hp > 0 {
            return dealt;
        }

        if has_saving_throw {
            let roll = state.rng.roll(saving.sides);
            let success = roll >= saving.success_on;
            out.broadcast(Notification::SavingThrow(SavingThrow { id: target, roll, success }));
            if success {
                if let Some(c) = state.characters.get_mut(&target) {
                    c.hp = saving.restore_hp.min(c.max_hp);
                    out.broadcast(Notification::HpUpdate(HpUpdate {
                        id: target,
                        hp: c.hp,
                        prev: 0,
                        change: HpChange::Heal,
                    }));
                }
                out.broadcast(Notification::CardPlayed(
                    CardPlayed::new("Saving Throw", owner).with_target(Some(target)),
                ));
                return dealt;
            }
        }

        Self::kill(state, out, target);
        dealt
    }

    /// Restore HP up to max. Returns the HP actually restored.
    pub fn apply_heal(state: &mut MatchState, out: &mut Outbox, target: CharacterId, amount: i32) -> i32 {
        let Some(c) = state.characters.get_mut(&target) else {
            return 0;
        };
        if c.dead || amount <= 0 {
            return 0;
        }
        let prev = c.hp;
        c.hp = (prev + amount).min(c.max_hp);
        let hp = c.hp;
        tracing::debug!(room = %state.room, %target, amount, prev, hp, "heal");
        out.broadcast(Notification::HpUpdate(HpUpdate { id: target, hp, prev, change: HpChange::Heal }));
        hp - prev
    }

    fn kill(state: &mut MatchState, out: &mut Outbox, id: CharacterId) {
        if let Some(c) = state.characters.get_mut(&id) {
            c.hp = 0;
            c.dead = true;
            c.status.clear();
        }
        state.tokens.remove(&id);
        tracing::debug!(room = %state.room, %id, "unit died");
        out.broadcast(Notification::UnitDied(UnitDied { id }));
        enqueue_respawn(state, id);

        for side in Side::BOTH {
            if state.living(side).next().is_none() {
                declare_winner(state, side.opponent(), out);
                break;
            }
        }
    }

    /// Pull enemies onto the actor's open neighbours.
    ///
    /// Eligible enemies are within reach (walls block), not already adjacent
    /// and not rooted. Enemies and open slots are both sorted by bearing
    /// from the actor; the rotation of slots minimising total angular
    /// displacement is applied, so relative order around the actor is kept.
    fn pull_enemies(state: &mut MatchState, out: &mut Outbox, ctx: &ResolveContext) -> ActionResult<Vec<CharacterId>> {
        let (origin, side) = actor_position(state, ctx.actor)?;
        let reach = ctx.reach.unwrap_or(u32::MAX);
        let board = state.board.clone();
        let bearing = |t: TileId| board.bearing(origin, t).unwrap_or(0.0);

        let mut slots: Vec<(f64, TileId)> = board
            .neighbors(origin)
            .iter()
            .filter(|t| !state.is_occupied(**t) && !state.is_walled(**t))
            .map(|t| (bearing(*t), *t))
            .collect();
        slots.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut eligible: Vec<(f64, CharacterId)> = state
            .tokens
            .iter()
            .filter(|(id, _)| id.side() != side)
            .filter(|(id, _)| state.character(**id).is_some_and(|c| !c.status.is_rooted()))
            .filter(|(_, tok)| {
                state
                    .wall_distance(origin, tok.tile)
                    .is_some_and(|d| d > 1 && d <= reach)
            })
            .map(|(id, tok)| (bearing(tok.tile), *id))
            .collect();
        eligible.sort_by(|a, b| a.0.total_cmp(&b.0));

        let m = slots.len();
        let k = eligible.len().min(m);
        if k == 0 {
            return Ok(Vec::new());
        }

        let cost = |r: usize| -> f64 {
            (0..k).map(|j| angle_diff(eligible[j].0, slots[(j + r) % m].0)).sum()
        };
        let best = (0..m)
            .min_by(|&a, &b| cost(a).total_cmp(&cost(b)))
            .unwrap_or(0);

        let mut pulled = Vec::with_capacity(k);
        for j in 0..k {
            let id = eligible[j].1;
            let dest = slots[(j + best) % m].1;
            if let Some(tok) = state.tokens.get_mut(&id) {
                tok.tile = dest;
                out.broadcast(Notification::Move(MoveEvent {
                    id,
                    owner: tok.owner,
                    to_tile: dest,
                    captured_id: None,
                }));
                pulled.push(id);
            }
        }
        Ok(pulled)
    }
}

/// First living ally of `target` (not `target` itself) holding an active redirect.
fn redirect_target(state: &MatchState, target: CharacterId) -> Option<CharacterId> {
    let side = target.side();
    state
        .living(side)
        .filter(|id| *id != target)
        .find(|id| state.character(*id).is_some_and(|c| c.is_alive() && c.status.redirects()))
}

fn actor_position(state: &MatchState, actor: CharacterId) -> ActionResult<(TileId, Side)> {
    let tok = state.token(actor).ok_or(ActionError::NotOnBoard(actor))?;
    Ok((tok.tile, tok.owner))
}

fn character_at(state: &MatchState, target: Target) -> ActionResult<CharacterId> {
    match target {
        Target::Character(id) => {
            if state.tokens.contains_key(&id) {
                Ok(id)
            } else {
                Err(ActionError::NotOnBoard(id))
            }
        }
        Target::Tile(tile) => state
            .occupant(tile)
            .ok_or(ActionError::InvalidTarget("no character on tile")),
    }
}

fn tile_of(state: &MatchState, target: Target) -> ActionResult<TileId> {
    match target {
        Target::Tile(tile) if state.board.contains(tile) => Ok(tile),
        Target::Tile(tile) => Err(ActionError::UnknownTile(tile)),
        Target::Character(id) => Ok(state.token(id).ok_or(ActionError::NotOnBoard(id))?.tile),
    }
}
