//! Per-side energy economy.
//!
//! Pools are bounded to `[0, max]` at every mutation. Income scales with
//! the round counter through configurable bands; payments either succeed
//! in full or leave the pool untouched.
//!
//! ```
//! use hex_tactics::core::Side;
//! use hex_tactics::energy::EnergyPools;
//!
//! let mut pools = EnergyPools::new(10);
//! pools.gain(Side::Player1, 3);
//! assert!(pools.pay(Side::Player1, 4).is_err());
//! assert_eq!(pools.balance(Side::Player1), 3);
//! pools.pay(Side::Player1, 2).unwrap();
//! assert_eq!(pools.balance(Side::Player1), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::config::IncomeBand;
use crate::core::{Side, SideMap};

/// A payment that could not be covered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("insufficient energy: have {have}, need {required}")]
pub struct Shortfall {
    pub have: u32,
    pub required: u32,
}

/// Energy balances of both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyPools {
    balances: SideMap<u32>,
    max: u32,
}

impl EnergyPools {
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self { balances: SideMap::with_value(0), max }
    }

    #[must_use]
    pub fn balance(&self, side: Side) -> u32 {
        self.balances[side]
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn balances(&self) -> &SideMap<u32> {
        &self.balances
    }

    #[must_use]
    pub fn can_pay(&self, side: Side, cost: u32) -> bool {
        self.balances[side] >= cost
    }

    /// Add energy, capped at max. Returns the amount actually added.
    pub fn gain(&mut self, side: Side, amount: u32) -> u32 {
        let before = self.balances[side];
        self.balances[side] = before.saturating_add(amount).min(self.max);
        self.balances[side] - before
    }

    /// Remove energy, floored at zero. Returns the amount actually removed.
    pub fn drain(&mut self, side: Side, amount: u32) -> u32 {
        let before = self.balances[side];
        self.balances[side] = before.saturating_sub(amount);
        before - self.balances[side]
    }

    /// Spend `cost`, or report the shortfall without mutating.
    pub fn pay(&mut self, side: Side, cost: u32) -> Result<(), Shortfall> {
        let have = self.balances[side];
        if have < cost {
            return Err(Shortfall { have, required: cost });
        }
        self.balances[side] = have - cost;
        Ok(())
    }

    /// Opponent loses up to `drain`, `side` gains `gain`; both clamped.
    pub fn siphon(&mut self, side: Side, drain: u32, gain: u32) {
        self.drain(side.opponent(), drain);
        self.gain(side, gain);
    }

    /// Grant the round-scaled income to a side.
    pub fn grant_income(&mut self, side: Side, round: u32, bands: &[IncomeBand]) -> u32 {
        self.gain(side, income_for_round(round, bands))
    }
}

/// Income for `round`: the first band whose `through_round` covers it.
#[must_use]
pub fn income_for_round(round: u32, bands: &[IncomeBand]) -> u32 {
    bands
        .iter()
        .find(|b| b.through_round.map_or(true, |limit| round <= limit))
        .or_else(|| bands.last())
        .map_or(0, |b| b.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EnergyRules;

    #[test]
    fn test_income_bands() {
        let bands = EnergyRules::default().income;
        let incomes: Vec<_> = (1..=10).map(|r| income_for_round(r, &bands)).collect();
        assert_eq!(incomes, vec![1, 1, 2, 2, 2, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn test_income_caps_at_max() {
        let mut pools = EnergyPools::new(10);
        pools.gain(Side::Player1, 9);
        let added = pools.grant_income(Side::Player1, 9, &EnergyRules::default().income);
        assert_eq!(added, 1);
        assert_eq!(pools.balance(Side::Player1), 10);
    }

    #[test]
    fn test_pay_failure_does_not_mutate() {
        let mut pools = EnergyPools::new(10);
        pools.gain(Side::Player2, 2);
        assert_eq!(pools.pay(Side::Player2, 3), Err(Shortfall { have: 2, required: 3 }));
        assert_eq!(pools.balance(Side::Player2), 2);
    }

    #[test]
    fn test_siphon_clamps_both_ends() {
        let mut pools = EnergyPools::new(10);
        pools.gain(Side::Player1, 10);
        pools.gain(Side::Player2, 1);
        pools.siphon(Side::Player1, 3, 1);
        assert_eq!(pools.balance(Side::Player2), 0);
        assert_eq!(pools.balance(Side::Player1), 10);
    }
}
