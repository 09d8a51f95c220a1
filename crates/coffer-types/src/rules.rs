//! Economy constants

use serde::{Deserialize, Serialize};

/// Numbers behind every reward, wager and robbery.
///
/// The defaults are the live economy; tests and operators may override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    /// Wallet balance of a freshly created account
    pub starting_wallet: u64,
    /// Daily reward before the streak bonus
    pub daily_base: u64,
    /// Added to the daily reward for every streak day already banked
    pub streak_bonus: u64,
    /// Targets holding less than this in their wallet cannot be robbed
    pub rob_min_target_wallet: u64,
    /// Probability that a robbery succeeds
    pub rob_success_chance: f64,
    /// Smallest amount a successful robbery takes
    pub rob_steal_min: u64,
    /// Largest amount a successful robbery takes
    pub rob_steal_max: u64,
    /// Smallest fine for a failed robbery
    pub rob_fine_min: u64,
    /// Largest fine for a failed robbery
    pub rob_fine_max: u64,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            starting_wallet: 1000,
            daily_base: 1000,
            streak_bonus: 50,
            rob_min_target_wallet: 100,
            rob_success_chance: 0.4,
            rob_steal_min: 50,
            rob_steal_max: 500,
            rob_fine_min: 100,
            rob_fine_max: 500,
        }
    }
}

impl EconomyRules {
    /// Daily reward owed to someone whose streak is `streak`.
    ///
    /// Returns `(base, bonus)`, or `None` if the bonus overflows.
    pub fn daily_reward(&self, streak: u32) -> Option<(u64, u64)> {
        let bonus = self.streak_bonus.checked_mul(u64::from(streak))?;
        self.daily_base.checked_add(bonus)?;
        Some((self.daily_base, bonus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_reward_grows_with_streak() {
        let rules = EconomyRules::default();
        assert_eq!(rules.daily_reward(0), Some((1000, 0)));
        assert_eq!(rules.daily_reward(3), Some((1000, 150)));
    }

    #[test]
    fn test_partial_rules_fill_from_defaults() {
        let rules: EconomyRules = serde_json::from_str(r#"{"daily_base": 10}"#).unwrap();
        assert_eq!(rules.daily_base, 10);
        assert_eq!(rules.streak_bonus, 50);
    }
}
