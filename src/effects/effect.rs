//! Effect definitions.
//!
//! Effects are the closed set of things an ability or card can do to the
//! match. Abilities are pure data (`AbilityDef`) pointing at one `Effect`;
//! the resolver interprets it by exhaustive `match`, so adding a kind is a
//! compile-time change rather than a runtime string lookup.
//!
//! ## Direct effects
//!
//! - `Damage`, `DiceDamage`: hit the target through the mitigation path
//! - `Heal`: restore HP up to max
//! - `TapHeal`: move HP from the actor to an ally
//! - `Cleanse`: wipe the target's status bucket
//! - `Status`: write a status slot
//!
//! ## Spatial effects
//!
//! - `Area`: nested effects on every matching occupant within a hop radius
//! - `Line`: damage enemies along a line from the actor toward the target
//! - `SwapPositions`: exchange actor and target tiles
//! - `Polar`: pull distant enemies onto the actor's open neighbours
//! - `HealAura`: place a timed healing zone on a tile and its neighbours

use serde::{Deserialize, Serialize};

use crate::status::StatusEffect;

/// Which occupants an area effect touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affects {
    Enemies,
    Allies,
    All,
}

/// How a line effect picks its tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineShape {
    /// Cube-coordinate hex line.
    Hex,
    /// Screen-space segment projection.
    Segment,
}

/// When a heal aura pulses for its owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraPulse {
    StartOfTurn,
    #[default]
    EndOfTurn,
    Both,
}

impl AuraPulse {
    #[must_use]
    pub fn at_start(self) -> bool {
        matches!(self, AuraPulse::StartOfTurn | AuraPulse::Both)
    }

    #[must_use]
    pub fn at_end(self) -> bool {
        matches!(self, AuraPulse::EndOfTurn | AuraPulse::Both)
    }
}

/// An ability or card effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Fixed damage.
    Damage { amount: i32 },

    /// Roll `1..=sides`, add `bonus`, deal that much damage.
    DiceDamage {
        sides: u32,
        #[serde(default)]
        bonus: i32,
    },

    /// Heal, clamped to max HP.
    Heal { amount: i32 },

    /// Actor loses `amount` HP, target gains it.
    TapHeal { amount: i32 },

    /// Clear every status slot on the target.
    Cleanse,

    /// Write a status slot on the target.
    Status { status: StatusEffect },

    /// Nested effects on occupants within `radius` hops of the actor.
    Area {
        radius: u32,
        affects: Affects,
        effects: Vec<Effect>,
    },

    /// Damage enemies on a line from the actor toward the target.
    Line {
        damage: i32,
        shape: LineShape,
        /// Tiles past the actor's own; `None` keeps the whole line.
        #[serde(default)]
        length: Option<usize>,
    },

    /// Exchange actor and target tiles.
    SwapPositions,

    /// Pull enemies in range onto open tiles adjacent to the actor.
    Polar,

    /// Timed healing zone on the target tile and its neighbours.
    HealAura {
        center_heal: i32,
        petal_heal: i32,
        duration: u32,
        #[serde(default)]
        pulse: AuraPulse,
    },
}

impl Effect {
    /// Convenience constructor for a damage effect.
    #[must_use]
    pub const fn damage(amount: i32) -> Self {
        Effect::Damage { amount }
    }

    /// Convenience constructor for a heal effect.
    #[must_use]
    pub const fn heal(amount: i32) -> Self {
        Effect::Heal { amount }
    }

    #[must_use]
    pub const fn status(status: StatusEffect) -> Self {
        Effect::Status { status }
    }

    /// Copy of this effect with `bonus` added to every damage figure.
    #[must_use]
    pub fn with_attack_bonus(&self, bonus: i32) -> Self {
        if bonus == 0 {
            return self.clone();
        }
        match self {
            Effect::Damage { amount } => Effect::Damage { amount: amount + bonus },
            Effect::DiceDamage { sides, bonus: b } => Effect::DiceDamage { sides: *sides, bonus: b + bonus },
            Effect::Line { damage, shape, length } => Effect::Line {
                damage: damage + bonus,
                shape: *shape,
                length: *length,
            },
            Effect::Area { radius, affects, effects } => Effect::Area {
                radius: *radius,
                affects: *affects,
                effects: effects.iter().map(|e| e.with_attack_bonus(bonus)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Whether the effect deals damage (directly or nested).
    #[must_use]
    pub fn is_offensive(&self) -> bool {
        match self {
            Effect::Damage { .. } | Effect::DiceDamage { .. } | Effect::Line { .. } | Effect::Polar => true,
            Effect::Area { effects, .. } => effects.iter().any(Effect::is_offensive),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_bonus_reaches_nested_damage() {
        let aoe = Effect::Area {
            radius: 1,
            affects: Affects::Enemies,
            effects: vec![Effect::damage(2), Effect::heal(1)],
        };
        let boosted = aoe.with_attack_bonus(1);
        let Effect::Area { effects, .. } = boosted else {
            panic!("expected area");
        };
        assert_eq!(effects[0], Effect::damage(3));
        assert_eq!(effects[1], Effect::heal(1));
    }

    #[test]
    fn test_attack_bonus_ignores_heals() {
        assert_eq!(Effect::heal(2).with_attack_bonus(5), Effect::heal(2));
        assert_eq!(
            Effect::DiceDamage { sides: 6, bonus: 0 }.with_attack_bonus(1),
            Effect::DiceDamage { sides: 6, bonus: 1 }
        );
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::json!({ "type": "line", "damage": 5, "shape": "segment", "length": 4 });
        let effect: Effect = serde_json::from_value(json).unwrap();
        assert_eq!(
            effect,
            Effect::Line { damage: 5, shape: LineShape::Segment, length: Some(4) }
        );

        let json = serde_json::json!({ "type": "status", "status": { "kind": "root", "turns": 3 } });
        let effect: Effect = serde_json::from_value(json).unwrap();
        assert_eq!(effect, Effect::status(StatusEffect::Root { turns: 3 }));
    }

    #[test]
    fn test_offensive_classification() {
        assert!(Effect::damage(1).is_offensive());
        assert!(Effect::Polar.is_offensive());
        assert!(!Effect::Cleanse.is_offensive());
        assert!(!Effect::heal(1).is_offensive());
    }
}
