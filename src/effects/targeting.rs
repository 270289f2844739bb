//! Target rules and range checks for abilities and cards.

use serde::{Deserialize, Serialize};

use crate::board::TileId;
use crate::core::{CharacterId, Side};

/// Who an ability may be aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    /// A living enemy character.
    #[default]
    Enemy,
    /// A living character on the actor's side (the actor included).
    Ally,
    /// Always the actor; any requested target is ignored.
    SelfOnly,
    /// Any living character.
    AnyCharacter,
    /// A board tile (or the tile of a target character).
    Tile,
}

impl Targeting {
    /// Whether a character owned by `target_side` is acceptable for an actor on `actor_side`.
    #[must_use]
    pub fn admits(self, actor_side: Side, target_side: Side) -> bool {
        match self {
            Targeting::Enemy => actor_side != target_side,
            Targeting::Ally => actor_side == target_side,
            Targeting::SelfOnly | Targeting::AnyCharacter | Targeting::Tile => true,
        }
    }
}

/// Range limit of an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRule {
    /// Maximum path distance (before any one-shot range bonus).
    pub max: u32,
    /// Require the distance to equal the limit exactly.
    #[serde(default)]
    pub exact: bool,
    /// Measure straight through walls.
    #[serde(default)]
    pub ignore_walls: bool,
}

impl RangeRule {
    #[must_use]
    pub const fn within(max: u32) -> Self {
        Self { max, exact: false, ignore_walls: false }
    }

    #[must_use]
    pub const fn exactly(max: u32) -> Self {
        Self { max, exact: true, ignore_walls: false }
    }

    #[must_use]
    pub const fn through_walls(mut self) -> Self {
        self.ignore_walls = true;
        self
    }

    /// Check a measured distance against this rule with `bonus` extra range.
    ///
    /// ```
    /// use hex_tactics::effects::RangeRule;
    ///
    /// assert!(RangeRule::within(2).admits(2, 0));
    /// assert!(!RangeRule::within(2).admits(3, 0));
    /// assert!(RangeRule::within(2).admits(3, 1));
    /// assert!(!RangeRule::exactly(3).admits(2, 0));
    /// ```
    #[must_use]
    pub fn admits(&self, distance: u32, bonus: u32) -> bool {
        let limit = self.max + bonus;
        if self.exact {
            distance == limit
        } else {
            distance <= limit
        }
    }
}

/// Resolved aim point of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Character(CharacterId),
    Tile(TileId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targeting_sides() {
        let (a, b) = (Side::Player1, Side::Player2);
        assert!(Targeting::Enemy.admits(a, b));
        assert!(!Targeting::Enemy.admits(a, a));
        assert!(Targeting::Ally.admits(a, a));
        assert!(!Targeting::Ally.admits(a, b));
        assert!(Targeting::AnyCharacter.admits(a, b));
    }

    #[test]
    fn test_exact_range_with_bonus() {
        let rule = RangeRule::exactly(3);
        assert!(rule.admits(3, 0));
        assert!(rule.admits(4, 1));
        assert!(!rule.admits(3, 1));
    }
}
