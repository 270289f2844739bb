//! Turn-boundary passes: status ticks, wall countdowns and aura heals.
//!
//! Countdowns only advance here, so time is measured in turn transitions.
//! The engine calls these in a fixed order during a handoff; each pass
//! touches only the side it is given, except the wall tick which is global.

use im::OrdMap;

use crate::board::TileId;
use crate::control::process_respawns;
use crate::core::state::{AuraLayers, TurnState};
use crate::core::{CharacterId, MatchState, Side};
use crate::effects::{AuraPulse, EffectResolver};
use crate::events::Outbox;

/// Pass run when `side` is about to act.
pub fn start_of_turn(state: &mut MatchState, side: Side, out: &mut Outbox) {
    state.turn[side] = TurnState::default();
    process_respawns(state, side, out);

    let roster: Vec<CharacterId> = state.living(side).collect();
    for id in roster {
        let Some(c) = state.characters.get_mut(&id) else {
            continue;
        };
        c.status.promote_pending();
        let burn = c.status.take_burn_tick();
        if let Some(per_tick) = burn {
            tracing::debug!(room = %state.room, %id, per_tick, "burn tick");
            EffectResolver::apply_damage(state, out, id, per_tick);
        }
        if let Some(c) = state.characters.get_mut(&id) {
            if !c.dead {
                c.status.decrement_timers();
            }
        }
    }

    pulse_heal_auras(state, side, AuraPulse::StartOfTurn, out);
}

/// Count every hard wall down by one and drop the expired ones.
pub fn tick_walls(state: &mut MatchState) {
    state.walls = state
        .walls
        .iter()
        .filter(|(_, ttl)| **ttl > 1)
        .map(|(tile, ttl)| (*tile, ttl - 1))
        .collect();
}

/// Layered aura heals for the side that just finished.
///
/// A unit standing on one of the side's centre layers heals the centre
/// amount, otherwise on one of its ring layers the ring amount. Each unit
/// heals at most once.
pub fn aura_wall_heals(state: &mut MatchState, side: Side, out: &mut Outbox) {
    let rules = state.config.rules.aura_wall;
    let has_layer = |m: &OrdMap<TileId, AuraLayers>, tile: TileId| m.get(&tile).is_some_and(|l| l[side] > 0);

    let heals: Vec<(CharacterId, i32)> = state
        .tokens
        .iter()
        .filter(|(_, tok)| tok.owner == side)
        .filter_map(|(id, tok)| {
            if has_layer(&state.aura_walls, tok.tile) {
                Some((*id, rules.center_heal))
            } else if has_layer(&state.aura_rings, tok.tile) {
                Some((*id, rules.ring_heal))
            } else {
                None
            }
        })
        .collect();

    for (id, amount) in heals {
        EffectResolver::apply_heal(state, out, id, amount);
    }
}

/// Decrement the side's aura layers, dropping tiles with no layer left.
pub fn tick_aura_layers(state: &mut MatchState, side: Side) {
    let tick = |m: &OrdMap<TileId, AuraLayers>| -> OrdMap<TileId, AuraLayers> {
        m.iter()
            .map(|(tile, layers)| {
                let mut layers = layers.clone();
                layers[side] = layers[side].saturating_sub(1);
                (*tile, layers)
            })
            .filter(|(_, layers)| layers.iter().any(|(_, ttl)| *ttl > 0))
            .collect()
    };
    state.aura_walls = tick(&state.aura_walls);
    state.aura_rings = tick(&state.aura_rings);
}

/// Heal `side`'s units standing in its own auras that pulse in `phase`.
///
/// Overlapping auras stack; healing is clamped to max HP.
pub fn pulse_heal_auras(state: &mut MatchState, side: Side, phase: AuraPulse, out: &mut Outbox) {
    let fires = |pulse: AuraPulse| match phase {
        AuraPulse::StartOfTurn => pulse.at_start(),
        AuraPulse::EndOfTurn => pulse.at_end(),
        AuraPulse::Both => pulse.at_start() || pulse.at_end(),
    };

    let mut heals: Vec<(CharacterId, i32)> = Vec::new();
    for aura in state.heal_auras.iter().filter(|a| a.owner == side && fires(a.pulse)) {
        for (id, tok) in state.tokens.iter().filter(|(_, t)| t.owner == side) {
            if tok.tile == aura.center {
                heals.push((*id, aura.center_heal));
            } else if aura.tiles.contains(&tok.tile) {
                heals.push((*id, aura.petal_heal));
            }
        }
    }

    for (id, amount) in heals {
        EffectResolver::apply_heal(state, out, id, amount);
    }
}

/// Count down the side's heal auras and prune the expired ones.
pub fn expire_heal_auras(state: &mut MatchState, side: Side) {
    state.heal_auras = state
        .heal_auras
        .iter()
        .cloned()
        .map(|mut aura| {
            if aura.owner == side {
                aura.remaining = aura.remaining.saturating_sub(1);
            }
            aura
        })
        .filter(|aura| aura.remaining > 0)
        .collect();
}

/// Passive self heal from the end-of-turn hero trait.
pub fn trait_heals(state: &mut MatchState, side: Side, out: &mut Outbox) {
    let heals: Vec<(CharacterId, i32)> = state
        .living(side)
        .filter_map(|id| {
            let amount = state.character(id)?.kit.traits.end_of_turn_heal;
            (amount > 0).then_some((id, amount))
        })
        .collect();
    for (id, amount) in heals {
        EffectResolver::apply_heal(state, out, id, amount);
    }
}

/// Decrement special cooldowns and clear one-turn bonuses of the side's characters.
pub fn settle_characters(state: &mut MatchState, side: Side) {
    let ids: Vec<CharacterId> = CharacterId::of_side(side).filter(|id| state.tokens.contains_key(id)).collect();
    for id in ids {
        if let Some(c) = state.characters.get_mut(&id) {
            c.special_cooldown = c.special_cooldown.saturating_sub(1);
            c.status.clear_turn_bonuses();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::HealAura;
    use crate::core::{GameRng, MatchConfig, MatchMode, RoomId, SideMap};
    use crate::status::StatusEffect;
    use smallvec::smallvec;
    use std::sync::Arc;

    fn id(s: &str) -> CharacterId {
        s.parse().unwrap()
    }

    fn t(s: &str) -> TileId {
        s.parse().unwrap()
    }

    fn state() -> MatchState {
        MatchState::new(
            RoomId::new("ticks"),
            MatchMode::Standard,
            Arc::new(MatchConfig::default()),
            Box::new(GameRng::new(2)),
        )
    }

    fn wound(state: &mut MatchState, who: &str, hp: i32) {
        state.characters.get_mut(&id(who)).unwrap().hp = hp;
    }

    fn hp(state: &MatchState, who: &str) -> i32 {
        state.character(id(who)).unwrap().hp
    }

    #[test]
    fn test_start_of_turn_burn_and_timers() {
        let mut st = state();
        {
            let fx = &mut st.characters.get_mut(&id("P1")).unwrap().status;
            fx.apply(StatusEffect::Burn { per_tick: 2, turns: 3 });
            fx.apply(StatusEffect::Root { turns: 1 });
            fx.apply(StatusEffect::PendingBuff { attack: 1, moves: 1 });
        }
        let mut out = Outbox::new();
        start_of_turn(&mut st, Side::Player1, &mut out);

        let c = st.character(id("P1")).unwrap();
        assert_eq!(c.hp, 16);
        assert_eq!(c.status.burn.unwrap().remaining, 2);
        assert!(!c.status.is_rooted());
        assert_eq!(c.status.attack_bonus, 1);
        assert_eq!(c.status.move_bonus, 1);
    }

    #[test]
    fn test_start_of_turn_only_touches_own_side() {
        let mut st = state();
        st.characters
            .get_mut(&id("E1"))
            .unwrap()
            .status
            .apply(StatusEffect::Burn { per_tick: 2, turns: 3 });
        let mut out = Outbox::new();
        start_of_turn(&mut st, Side::Player1, &mut out);
        assert_eq!(hp(&st, "E1"), 18);
    }

    #[test]
    fn test_burn_can_kill() {
        let mut st = state();
        wound(&mut st, "P2", 2);
        st.characters
            .get_mut(&id("P2"))
            .unwrap()
            .status
            .apply(StatusEffect::Burn { per_tick: 2, turns: 3 });
        let mut out = Outbox::new();
        start_of_turn(&mut st, Side::Player1, &mut out);
        let c = st.character(id("P2")).unwrap();
        assert!(c.dead);
        assert!(c.status.is_empty());
    }

    #[test]
    fn test_walls_expire() {
        let mut st = state();
        st.walls.insert(t("E4"), 2);
        st.walls.insert(t("E5"), 1);
        tick_walls(&mut st);
        assert_eq!(st.walls.get(&t("E4")), Some(&1));
        assert!(!st.is_walled(t("E5")));
    }

    #[test]
    fn test_aura_wall_heals_once_per_unit() {
        let mut st = state();
        st.tokens.get_mut(&id("P1")).unwrap().tile = t("E4");
        st.tokens.get_mut(&id("P2")).unwrap().tile = t("E5");
        wound(&mut st, "P1", 10);
        wound(&mut st, "P2", 5);
        let mut layers = SideMap::default();
        layers[Side::Player1] = 2;
        st.aura_walls.insert(t("E4"), layers.clone());
        st.aura_rings.insert(t("E4"), layers.clone());
        st.aura_rings.insert(t("E5"), layers);

        let mut out = Outbox::new();
        aura_wall_heals(&mut st, Side::Player1, &mut out);
        assert_eq!(hp(&st, "P1"), 12);
        assert_eq!(hp(&st, "P2"), 6);

        // the other side's layer does nothing for player 1
        aura_wall_heals(&mut st, Side::Player2, &mut out);
        assert_eq!(hp(&st, "P1"), 12);
    }

    #[test]
    fn test_aura_layers_tick_per_side() {
        let mut st = state();
        let mut layers = SideMap::default();
        layers[Side::Player1] = 1;
        layers[Side::Player2] = 2;
        st.aura_walls.insert(t("E4"), layers);

        tick_aura_layers(&mut st, Side::Player1);
        let left = st.aura_walls.get(&t("E4")).unwrap();
        assert_eq!(left[Side::Player1], 0);
        assert_eq!(left[Side::Player2], 2);

        tick_aura_layers(&mut st, Side::Player2);
        tick_aura_layers(&mut st, Side::Player2);
        assert!(st.aura_walls.is_empty());
    }

    #[test]
    fn test_heal_aura_pulse_and_expiry() {
        let mut st = state();
        st.tokens.get_mut(&id("P3")).unwrap().tile = t("E4");
        st.tokens.get_mut(&id("P4")).unwrap().tile = t("E5");
        wound(&mut st, "P3", 5);
        wound(&mut st, "P4", 5);
        st.heal_auras.push_back(HealAura {
            owner: Side::Player1,
            center: t("E4"),
            tiles: smallvec![t("E4"), t("E5")],
            remaining: 1,
            center_heal: 2,
            petal_heal: 1,
            pulse: AuraPulse::EndOfTurn,
        });

        let mut out = Outbox::new();
        pulse_heal_auras(&mut st, Side::Player1, AuraPulse::StartOfTurn, &mut out);
        assert_eq!(hp(&st, "P3"), 5);

        pulse_heal_auras(&mut st, Side::Player1, AuraPulse::EndOfTurn, &mut out);
        assert_eq!(hp(&st, "P3"), 7);
        assert_eq!(hp(&st, "P4"), 6);

        expire_heal_auras(&mut st, Side::Player2);
        assert_eq!(st.heal_auras.len(), 1);
        expire_heal_auras(&mut st, Side::Player1);
        assert!(st.heal_auras.is_empty());
    }

    #[test]
    fn test_settle_clears_bonuses_and_cooldowns() {
        let mut st = state();
        {
            let c = st.characters.get_mut(&id("P2")).unwrap();
            c.special_cooldown = 2;
            c.status.attack_bonus = 1;
        }
        settle_characters(&mut st, Side::Player1);
        let c = st.character(id("P2")).unwrap();
        assert_eq!(c.special_cooldown, 1);
        assert_eq!(c.status.attack_bonus, 0);
    }

    #[test]
    fn test_settle_skips_characters_off_the_board() {
        let mut st = state();
        for who in ["P1", "P2"] {
            st.characters.get_mut(&id(who)).unwrap().special_cooldown = 2;
        }
        st.tokens.remove(&id("P2"));
        settle_characters(&mut st, Side::Player1);
        assert_eq!(st.character(id("P1")).unwrap().special_cooldown, 1);
        assert_eq!(st.character(id("P2")).unwrap().special_cooldown, 2);
    }
}
