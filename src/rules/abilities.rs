//! Primary and special abilities.
//!
//! An ability use goes through the same gate regardless of what it does:
//!
//! 1. the source is on the board, belongs to the acting side and has not
//!    acted this turn
//! 2. slot checks (cooldown, "moved this turn")
//! 3. target resolution against the ability's targeting rule
//! 4. range check with the side's one-shot range bonus
//! 5. energy payment
//! 6. effect resolution with the source's attack bonuses folded in
//!
//! Any failure leaves the draft to be discarded by the engine.

use crate::board::TileId;
use crate::core::config::AbilityDef;
use crate::core::{CharacterId, MatchState, Side};
use crate::effects::{Effect, EffectResolver, ResolveContext, Target, Targeting};
use crate::error::{ActionError, ActionResult};
use crate::events::{AbilityKind, AbilityUsed, CardPlayed, Notification, Outbox};

use super::charge;

/// Where an ability was aimed, as sent by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aim {
    pub target: Option<CharacterId>,
    pub tile: Option<TileId>,
}

impl Aim {
    #[must_use]
    pub fn at(target: CharacterId) -> Self {
        Self { target: Some(target), tile: None }
    }

    #[must_use]
    pub fn tile(tile: TileId) -> Self {
        Self { target: None, tile: Some(tile) }
    }
}

/// Use a character's primary or special ability.
pub fn use_ability(
    state: &mut MatchState,
    side: Side,
    kind: AbilityKind,
    source: CharacterId,
    aim: Aim,
    out: &mut Outbox,
) -> ActionResult<()> {
    let origin = state.token(source).ok_or(ActionError::NotOnBoard(source))?.tile;
    if source.side() != side {
        return Err(ActionError::NotOwner(source));
    }
    if state.turn[side].acted.contains(&source) {
        return Err(ActionError::AlreadyActed);
    }

    let character = state.character(source).ok_or(ActionError::NotOnBoard(source))?;
    let ability: AbilityDef = match kind {
        AbilityKind::Primary => character.kit.primary.clone(),
        AbilityKind::Special => character.kit.special.clone(),
    };
    if kind == AbilityKind::Special && character.special_cooldown > 0 {
        return Err(ActionError::OnCooldown(character.special_cooldown));
    }
    if ability.requires_moved && !state.turn[side].moved.contains(&source) {
        return Err(ActionError::Requirement("must move first this turn"));
    }
    let transform = character.status.transform();
    let attack_bonus = character.status.attack_bonus + transform.map_or(0, |t| t.extra_attack);
    let name = match (&ability.transformed_name, transform) {
        (Some(alt), Some(_)) => alt.clone(),
        _ => ability.name.clone(),
    };

    let target = resolve_target(state, side, source, &ability, aim)?;
    let range_bonus = state.turn[side].range_bonus_next;
    if ability.target != Targeting::SelfOnly {
        check_range(state, &ability, origin, target, range_bonus)?;
    }

    if let Some(key) = &ability.cost {
        charge(state, side, key)?;
    }

    let effect = ability.effect.with_attack_bonus(attack_bonus);
    let ctx = ResolveContext::new(source)
        .with_reach(ability.range.map(|r| r.max + range_bonus))
        .with_range_bonus(range_bonus);
    let resolution = EffectResolver::resolve(state, out, &ctx, target, &effect)?;

    let turn = &mut state.turn[side];
    turn.acted.insert(source);
    turn.range_bonus_next = 0;
    if matches!(effect, Effect::SwapPositions) {
        turn.moved.insert(source);
        if let Target::Character(other) = target {
            turn.moved.insert(other);
        }
    }
    if kind == AbilityKind::Special {
        if let Some(c) = state.characters.get_mut(&source) {
            c.special_cooldown = ability.cooldown;
        }
    }

    let record = match (&effect, resolution.roll) {
        (Effect::DiceDamage { bonus, .. }, Some(roll)) if *bonus > 0 => format!("{name}SC-{}", roll as i32 + bonus),
        (Effect::DiceDamage { .. }, Some(roll)) => format!("{name}-{roll}"),
        _ => name.clone(),
    };
    let target_id = match target {
        Target::Character(id) => Some(id),
        Target::Tile(_) => None,
    };

    tracing::debug!(room = %state.room, %source, ability = %name, hits = resolution.hits.len(), "ability used");
    out.broadcast(Notification::AbilityUsed(AbilityUsed {
        kind,
        source_id: source,
        target_id,
        name,
        hits: resolution.hits,
        tiles: resolution.tiles,
        roll: resolution.roll,
    }));
    state.last_discard[side] = Some(record.clone());
    out.broadcast(Notification::CardPlayed(CardPlayed::new(record, side)));
    Ok(())
}

fn resolve_target(
    state: &MatchState,
    side: Side,
    source: CharacterId,
    ability: &AbilityDef,
    aim: Aim,
) -> ActionResult<Target> {
    match ability.target {
        Targeting::SelfOnly => Ok(Target::Character(source)),
        Targeting::Tile => match (aim.tile, aim.target) {
            (Some(tile), _) if state.board.contains(tile) => Ok(Target::Tile(tile)),
            (Some(tile), _) => Err(ActionError::UnknownTile(tile)),
            (None, Some(id)) => Ok(Target::Tile(state.token(id).ok_or(ActionError::NotOnBoard(id))?.tile)),
            (None, None) => Err(ActionError::InvalidTarget("a tile is required")),
        },
        rule => {
            let id = aim.target.ok_or(ActionError::InvalidTarget("a target is required"))?;
            state.token(id).ok_or(ActionError::NotOnBoard(id))?;
            if !rule.admits(side, id.side()) {
                return Err(ActionError::InvalidTarget(match rule {
                    Targeting::Ally => "target must be an ally",
                    _ => "target must be an enemy",
                }));
            }
            let hidden = state.character(id).is_some_and(|c| c.status.is_invisible());
            if hidden && id.side() != side {
                return Err(ActionError::Invisible);
            }
            Ok(Target::Character(id))
        }
    }
}

fn check_range(state: &MatchState, ability: &AbilityDef, origin: TileId, target: Target, bonus: u32) -> ActionResult<()> {
    let Some(range) = ability.range else {
        return Ok(());
    };
    let to = match target {
        Target::Tile(tile) => tile,
        Target::Character(id) => state.token(id).ok_or(ActionError::NotOnBoard(id))?.tile,
    };
    let distance = if range.ignore_walls {
        state.board.distance(origin, to, |_| false)
    } else {
        state.wall_distance(origin, to)
    }
    .ok_or(ActionError::Unreachable)?;

    if range.admits(distance, bonus) {
        Ok(())
    } else {
        Err(ActionError::OutOfRange { distance, limit: range.max + bonus })
    }
}
