//! Resource cards.
//!
//! Each side may play one card per turn. Cards are gated independently of
//! character actions: playing one never marks a character as acted, except
//! Blossom Wall cast through a source character and Teleport, which counts
//! as the source's move.

use crate::board::TileId;
use crate::core::state::AuraLayers;
use crate::core::{CardKind, CharacterId, MatchState, Side};
use crate::effects::Targeting;
use crate::error::{ActionError, ActionResult};
use crate::events::{CardPlayed, CardRevealed, MoveEvent, Notification, Outbox};
use crate::status::StatusEffect;

use super::charge;

/// Optional fields of a card play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardArgs {
    pub tile: Option<TileId>,
    pub source: Option<CharacterId>,
    pub to_tile: Option<TileId>,
    pub target: Option<CharacterId>,
}

/// Play a card for `side`.
pub fn play_card(state: &mut MatchState, side: Side, card: CardKind, args: CardArgs, out: &mut Outbox) -> ActionResult<()> {
    if state.turn[side].card_played {
        return Err(ActionError::CardAlreadyPlayed);
    }
    let rules = state.config.rules.cards;
    let mut played = CardPlayed::new(card.wire_name(), side);

    match card {
        CardKind::Fireball | CardKind::Entangle | CardKind::IronSkin | CardKind::InvisibilityPotion => {
            let (rule, status) = match card {
                CardKind::Fireball => (Targeting::Enemy, rules.fireball),
                CardKind::Entangle => (Targeting::Enemy, rules.entangle),
                CardKind::IronSkin => (Targeting::Ally, rules.iron_skin),
                _ => (Targeting::Ally, rules.invisibility),
            };
            let target = card_target(state, side, args.target, rule)?;
            charge(state, side, card.cost_key())?;
            apply_status(state, target, status);
            played = played.with_target(Some(target));
        }

        CardKind::Cleanse => {
            let target = card_target(state, side, args.target, Targeting::AnyCharacter)?;
            charge(state, side, card.cost_key())?;
            if let Some(c) = state.characters.get_mut(&target) {
                c.status.clear();
            }
            played = played.with_target(Some(target));
        }

        CardKind::Scope => {
            charge(state, side, card.cost_key())?;
            state.turn[side].range_bonus_next += rules.scope_range;
        }

        CardKind::Siphon => {
            charge(state, side, card.cost_key())?;
            state.energy.siphon(side, rules.siphon_drain, rules.siphon_gain);
        }

        CardKind::Sprint | CardKind::SideStep | CardKind::Dash | CardKind::Blink => {
            let source = unmoved_source(state, side, args.source)?;
            charge(state, side, card.cost_key())?;
            let turn = &mut state.turn[side];
            match card {
                CardKind::Dash => turn.steps_bonus += rules.dash_steps,
                CardKind::Blink => turn.min_steps = turn.min_steps.max(rules.blink_min_steps),
                _ => turn.steps_bonus_next += rules.sprint_steps,
            }
            played = played.with_source(source);
        }

        CardKind::Wall => {
            let tile = args.tile.ok_or(ActionError::InvalidTarget("a tile is required"))?;
            open_tile(state, tile)?;
            charge(state, side, card.cost_key())?;
            state.walls.insert(tile, rules.wall_ttl);
            played = played.with_tile(Some(tile));
        }

        CardKind::Shatter => {
            let tile = args.tile.ok_or(ActionError::InvalidTarget("a tile is required"))?;
            if !state.is_walled(tile) {
                return Err(ActionError::NoWall(tile));
            }
            charge(state, side, card.cost_key())?;
            state.walls.remove(&tile);
            played = played.with_tile(Some(tile));
        }

        CardKind::BlossomWall => {
            let tile = args.tile.ok_or(ActionError::InvalidTarget("a tile is required"))?;
            if !state.board.contains(tile) {
                return Err(ActionError::UnknownTile(tile));
            }
            if state.is_walled(tile) {
                return Err(ActionError::Walled(tile));
            }
            if let Some(source) = args.source {
                let token = state.token(source).ok_or(ActionError::NotOnBoard(source))?;
                if token.owner != side {
                    return Err(ActionError::NotOwner(source));
                }
                if state.turn[side].acted.contains(&source) {
                    return Err(ActionError::AlreadyActed);
                }
            }
            charge(state, side, card.cost_key())?;
            place_aura_wall(state, side, tile);
            if let Some(source) = args.source {
                state.turn[side].acted.insert(source);
            }
            played = played.with_source(args.source).with_tile(Some(tile));
        }

        CardKind::Teleport => {
            let source = unmoved_source(state, side, args.source)?;
            let source = source.ok_or(ActionError::InvalidTarget("a source is required"))?;
            if state.character(source).is_some_and(|c| c.status.is_rooted()) {
                return Err(ActionError::Rooted);
            }
            let to = args.to_tile.ok_or(ActionError::InvalidTarget("a destination is required"))?;
            open_tile(state, to)?;
            let from = state.token(source).ok_or(ActionError::NotOnBoard(source))?.tile;
            let distance = state.board.distance(from, to, |_| false).ok_or(ActionError::Unreachable)?;
            if distance > rules.teleport_range {
                return Err(ActionError::OutOfRange { distance, limit: rules.teleport_range });
            }
            charge(state, side, card.cost_key())?;

            if let Some(token) = state.tokens.get_mut(&source) {
                token.tile = to;
                token.has_moved_ever = true;
            }
            state.turn[side].moved.insert(source);
            played = played.with_source(Some(source)).with_tile(Some(to));
            out.broadcast(Notification::CardPlayed(played));
            out.broadcast(Notification::Move(MoveEvent { id: source, owner: side, to_tile: to, captured_id: None }));
            finish(state, side, card);
            return Ok(());
        }
    }

    out.broadcast(Notification::CardPlayed(played));
    finish(state, side, card);
    Ok(())
}

/// Show a card without playing it. Needs affordability, spends nothing.
pub fn reveal_card(state: &mut MatchState, side: Side, card: CardKind, out: &mut Outbox) -> ActionResult<()> {
    let key = card.cost_key();
    let required = state.config.costs.cost(key);
    if !state.energy.can_pay(side, required) {
        let have = state.energy.balance(side);
        return Err(ActionError::InsufficientEnergy { card: key.to_string(), have, required });
    }
    state.last_discard[side] = Some(card.wire_name().to_string());
    out.broadcast(Notification::CardRevealed(CardRevealed { who: side, card: card.wire_name().to_string() }));
    Ok(())
}

fn finish(state: &mut MatchState, side: Side, card: CardKind) {
    state.turn[side].card_played = true;
    state.last_discard[side] = Some(card.display_name().to_string());
    tracing::debug!(room = %state.room, %side, %card, "card played");
}

fn apply_status(state: &mut MatchState, target: CharacterId, status: StatusEffect) {
    if let Some(c) = state.characters.get_mut(&target) {
        c.status.apply(status);
    }
}

/// Validate a character target for a card.
fn card_target(state: &MatchState, side: Side, target: Option<CharacterId>, rule: Targeting) -> ActionResult<CharacterId> {
    let id = target.ok_or(ActionError::InvalidTarget("a target is required"))?;
    state.token(id).ok_or(ActionError::NotOnBoard(id))?;
    if !rule.admits(side, id.side()) {
        return Err(ActionError::InvalidTarget(match rule {
            Targeting::Ally => "target must be an ally",
            _ => "target must be an enemy",
        }));
    }
    if id.side() != side && state.character(id).is_some_and(|c| c.status.is_invisible()) {
        return Err(ActionError::Invisible);
    }
    Ok(id)
}

/// Movement cards name an own character that has not moved yet, if they name one.
fn unmoved_source(state: &MatchState, side: Side, source: Option<CharacterId>) -> ActionResult<Option<CharacterId>> {
    let Some(id) = source else {
        return Ok(None);
    };
    let token = state.token(id).ok_or(ActionError::NotOnBoard(id))?;
    if token.owner != side {
        return Err(ActionError::NotOwner(id));
    }
    if state.turn[side].moved.contains(&id) {
        return Err(ActionError::AlreadyMoved);
    }
    Ok(Some(id))
}

fn open_tile(state: &MatchState, tile: TileId) -> ActionResult<()> {
    if !state.board.contains(tile) {
        return Err(ActionError::UnknownTile(tile));
    }
    if state.is_walled(tile) {
        return Err(ActionError::Walled(tile));
    }
    if state.is_occupied(tile) {
        return Err(ActionError::Occupied(tile));
    }
    Ok(())
}

/// Layer a centre on `tile` and a ring on its unwalled neighbours for `side`.
fn place_aura_wall(state: &mut MatchState, side: Side, tile: TileId) {
    let ttl = state.config.rules.aura_wall.ttl;
    let layer = |layers: Option<&AuraLayers>| {
        let mut layers = layers.cloned().unwrap_or_default();
        layers[side] = ttl;
        layers
    };
    let center = layer(state.aura_walls.get(&tile));
    state.aura_walls.insert(tile, center);

    let ring: Vec<TileId> = state
        .board
        .neighbors(tile)
        .iter()
        .copied()
        .filter(|t| !state.is_walled(*t))
        .collect();
    for t in ring {
        let layers = layer(state.aura_rings.get(&t));
        state.aura_rings.insert(t, layers);
    }
}
