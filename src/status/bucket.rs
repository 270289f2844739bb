//! Per-character status bucket.
//!
//! Each status kind has its own optional slot. Slots are written, ticked and
//! removed independently; removing one never touches another. Field names
//! serialize with the keys clients already read from the `fx` map.

use serde::{Deserialize, Serialize};

/// Simple countdown slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub remaining: u32,
}

/// Damage over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burn {
    pub remaining: u32,
    #[serde(rename = "per")]
    pub per_tick: i32,
}

/// Flat reduction of incoming damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IronSkin {
    pub remaining: u32,
    pub reduce: i32,
}

/// Shapeshift: percentage mitigation plus movement and attack bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub remaining: u32,
    pub mitigation_pct: u32,
    pub extra_moves: u32,
    pub extra_attack: i32,
}

/// Buff queued now and promoted at the start of the owner's next turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBuff {
    pub attack: i32,
    #[serde(rename = "move")]
    pub moves: u32,
}

/// A status to write into a bucket. Writing refreshes an existing slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusEffect {
    Burn { per_tick: i32, turns: u32 },
    Root { turns: u32 },
    IronSkin { reduce: i32, turns: u32 },
    Invisible { turns: u32 },
    Transform { turns: u32, mitigation_pct: u32, extra_moves: u32, extra_attack: i32 },
    Redirect { turns: u32 },
    PendingBuff { attack: i32, moves: u32 },
}

/// All status slots of one character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusBucket {
    #[serde(rename = "fireDot", skip_serializing_if = "Option::is_none")]
    pub burn: Option<Burn>,
    #[serde(rename = "entangle", skip_serializing_if = "Option::is_none")]
    pub root: Option<Timer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iron_skin: Option<IronSkin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invisible: Option<Timer>,
    #[serde(rename = "bear", skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Timer>,
    #[serde(rename = "skillCheckNext", skip_serializing_if = "Option::is_none")]
    pub pending_buff: Option<PendingBuff>,
    /// Attack bonus active for the owner's current turn.
    #[serde(rename = "attackBonusThisTurn")]
    pub attack_bonus: i32,
    /// Extra steps for the owner's current turn.
    #[serde(rename = "moveBonusThisTurn")]
    pub move_bonus: u32,
}

fn active(slot: Option<Timer>) -> bool {
    slot.is_some_and(|t| t.remaining > 0)
}

/// Decrement a countdown slot and drop it at zero.
fn tick<T>(slot: &mut Option<T>, remaining: impl Fn(&mut T) -> &mut u32) {
    if let Some(inner) = slot.as_mut() {
        let r = remaining(inner);
        *r = r.saturating_sub(1);
        if *r == 0 {
            *slot = None;
        }
    }
}

impl StatusBucket {
    /// Write a status into its slot, replacing any previous value.
    pub fn apply(&mut self, status: StatusEffect) {
        match status {
            StatusEffect::Burn { per_tick, turns } => {
                self.burn = Some(Burn { remaining: turns, per_tick });
            }
            StatusEffect::Root { turns } => self.root = Some(Timer { remaining: turns }),
            StatusEffect::IronSkin { reduce, turns } => {
                self.iron_skin = Some(IronSkin { remaining: turns, reduce });
            }
            StatusEffect::Invisible { turns } => self.invisible = Some(Timer { remaining: turns }),
            StatusEffect::Transform { turns, mitigation_pct, extra_moves, extra_attack } => {
                self.transform = Some(Transform {
                    remaining: turns,
                    mitigation_pct: mitigation_pct.min(100),
                    extra_moves,
                    extra_attack,
                });
            }
            StatusEffect::Redirect { turns } => self.redirect = Some(Timer { remaining: turns }),
            StatusEffect::PendingBuff { attack, moves } => {
                self.pending_buff = Some(PendingBuff { attack, moves });
            }
        }
    }

    /// Wipe every slot, including one-turn bonuses.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_rooted(&self) -> bool {
        active(self.root)
    }

    #[must_use]
    pub fn is_invisible(&self) -> bool {
        active(self.invisible)
    }

    #[must_use]
    pub fn redirects(&self) -> bool {
        active(self.redirect)
    }

    /// Active transform, if any.
    #[must_use]
    pub fn transform(&self) -> Option<Transform> {
        self.transform.filter(|t| t.remaining > 0)
    }

    /// Apply mitigation to incoming damage: percentage from a transform
    /// (rounded up), then the flat iron-skin reduction, floored at zero.
    ///
    /// ```
    /// use hex_tactics::status::{StatusBucket, StatusEffect};
    ///
    /// let mut fx = StatusBucket::default();
    /// fx.apply(StatusEffect::Transform { turns: 3, mitigation_pct: 50, extra_moves: 1, extra_attack: 2 });
    /// fx.apply(StatusEffect::IronSkin { reduce: 2, turns: 2 });
    /// assert_eq!(fx.mitigate(10), 3);
    /// ```
    #[must_use]
    pub fn mitigate(&self, amount: i32) -> i32 {
        let mut dmg = amount.max(0);
        if let Some(t) = self.transform() {
            let keep = 100 - t.mitigation_pct.min(100) as i32;
            dmg = (dmg * keep + 99) / 100;
        }
        if let Some(skin) = self.iron_skin.filter(|s| s.remaining > 0) {
            dmg = (dmg - skin.reduce).max(0);
        }
        dmg
    }

    /// Move a pending buff into this turn's bonuses.
    pub fn promote_pending(&mut self) {
        if let Some(buff) = self.pending_buff.take() {
            self.attack_bonus = buff.attack;
            self.move_bonus = buff.moves;
        }
    }

    /// Take one burn tick: returns the damage to deal, counting the slot down.
    pub fn take_burn_tick(&mut self) -> Option<i32> {
        let burn = self.burn.filter(|b| b.remaining > 0)?;
        tick(&mut self.burn, |b| &mut b.remaining);
        Some(burn.per_tick)
    }

    /// Count down root, iron skin, invisibility, transform and redirect.
    pub fn decrement_timers(&mut self) {
        tick(&mut self.root, |t| &mut t.remaining);
        tick(&mut self.iron_skin, |s| &mut s.remaining);
        tick(&mut self.invisible, |t| &mut t.remaining);
        tick(&mut self.transform, |t| &mut t.remaining);
        tick(&mut self.redirect, |t| &mut t.remaining);
    }

    pub fn clear_turn_bonuses(&mut self) {
        self.attack_bonus = 0;
        self.move_bonus = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mitigation_order() {
        let mut fx = StatusBucket::default();
        fx.apply(StatusEffect::Transform { turns: 3, mitigation_pct: 50, extra_moves: 1, extra_attack: 2 });
        assert_eq!(fx.mitigate(10), 5);
        assert_eq!(fx.mitigate(5), 3);

        fx.apply(StatusEffect::IronSkin { reduce: 2, turns: 2 });
        assert_eq!(fx.mitigate(10), 3);
        assert_eq!(fx.mitigate(1), 0);
    }

    #[test]
    fn test_no_mitigation_passes_through() {
        let fx = StatusBucket::default();
        assert_eq!(fx.mitigate(7), 7);
        assert_eq!(fx.mitigate(-3), 0);
    }

    #[test]
    fn test_burn_ticks_then_expires() {
        let mut fx = StatusBucket::default();
        fx.apply(StatusEffect::Burn { per_tick: 2, turns: 2 });
        assert_eq!(fx.take_burn_tick(), Some(2));
        assert!(fx.burn.is_some());
        assert_eq!(fx.take_burn_tick(), Some(2));
        assert!(fx.burn.is_none());
        assert_eq!(fx.take_burn_tick(), None);
    }

    #[test]
    fn test_timers_are_independent() {
        let mut fx = StatusBucket::default();
        fx.apply(StatusEffect::Root { turns: 1 });
        fx.apply(StatusEffect::Redirect { turns: 2 });
        fx.decrement_timers();
        assert!(!fx.is_rooted());
        assert!(fx.root.is_none());
        assert!(fx.redirects());
        fx.decrement_timers();
        assert!(!fx.redirects());
    }

    #[test]
    fn test_pending_buff_promotion() {
        let mut fx = StatusBucket::default();
        fx.apply(StatusEffect::PendingBuff { attack: 1, moves: 1 });
        assert_eq!(fx.attack_bonus, 0);
        fx.promote_pending();
        assert_eq!(fx.attack_bonus, 1);
        assert_eq!(fx.move_bonus, 1);
        assert!(fx.pending_buff.is_none());
        fx.clear_turn_bonuses();
        assert!(fx.is_empty());
    }

    #[test]
    fn test_serializes_client_keys() {
        let mut fx = StatusBucket::default();
        fx.apply(StatusEffect::Burn { per_tick: 2, turns: 3 });
        fx.apply(StatusEffect::Root { turns: 3 });
        let json = serde_json::to_value(&fx).unwrap();
        assert_eq!(json["fireDot"]["remaining"], 3);
        assert_eq!(json["fireDot"]["per"], 2);
        assert_eq!(json["entangle"]["remaining"], 3);
        assert!(json.get("bear").is_none());
    }
}
