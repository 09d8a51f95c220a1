//! The two-card chance game played against the house.

use coffer_types::WagerOutcome;

use crate::Randomness;

/// Lowest card value
pub const CARD_MIN: u64 = 1;
/// Highest card value
pub const CARD_MAX: u64 = 11;
/// The winning total
pub const TARGET: u32 = 21;

/// Cards held by both sides after the deal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal {
    pub player: [u32; 2],
    pub house: [u32; 2],
}

impl Deal {
    /// Draw two cards for the player, then two for the house. Draws outside
    /// the card range are clamped into it.
    pub fn draw(randomness: &dyn Randomness) -> Self {
        let card = || randomness.range(CARD_MIN, CARD_MAX).clamp(CARD_MIN, CARD_MAX) as u32;
        let player = [card(), card()];
        let house = [card(), card()];
        Self { player, house }
    }

    pub fn player_total(&self) -> u32 {
        self.player.iter().sum()
    }

    pub fn house_total(&self) -> u32 {
        self.house.iter().sum()
    }

    pub fn outcome(&self) -> WagerOutcome {
        classify(self.player_total(), self.house_total())
    }
}

/// Decide a hand. Rules are checked in priority order, so a player 21 beats
/// a house bust and a player bust loses even when the house busts too.
pub fn classify(player: u32, house: u32) -> WagerOutcome {
    if player == TARGET {
        WagerOutcome::Blackjack
    } else if player > TARGET {
        WagerOutcome::Bust
    } else if house > TARGET {
        WagerOutcome::HouseBust
    } else if player > house {
        WagerOutcome::Win
    } else if player < house {
        WagerOutcome::Lose
    } else {
        WagerOutcome::Push
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedRandomness;

    #[test]
    fn test_priority_order() {
        assert_eq!(classify(21, 21), WagerOutcome::Blackjack);
        assert_eq!(classify(21, 22), WagerOutcome::Blackjack);
        assert_eq!(classify(22, 22), WagerOutcome::Bust);
        assert_eq!(classify(20, 22), WagerOutcome::HouseBust);
        assert_eq!(classify(18, 17), WagerOutcome::Win);
        assert_eq!(classify(12, 17), WagerOutcome::Lose);
        assert_eq!(classify(17, 17), WagerOutcome::Push);
    }

    #[test]
    fn test_deal_order() {
        let rng = ScriptedRandomness::new().with_ranges([10, 11, 2, 3]);
        let deal = Deal::draw(&rng);

        assert_eq!(deal.player, [10, 11]);
        assert_eq!(deal.house, [2, 3]);
        assert_eq!(deal.player_total(), 21);
        assert_eq!(deal.outcome(), WagerOutcome::Blackjack);
    }

    /// Ignores the requested bounds.
    struct Unbounded;

    impl Randomness for Unbounded {
        fn range(&self, _low: u64, _high: u64) -> u64 {
            u64::MAX
        }

        fn chance(&self, _probability: f64) -> bool {
            true
        }
    }

    #[test]
    fn test_out_of_range_draws_are_clamped() {
        let deal = Deal::draw(&Unbounded);

        assert_eq!(deal.player, [11, 11]);
        assert_eq!(deal.house, [11, 11]);
        assert_eq!(deal.outcome(), WagerOutcome::Bust);
    }
}
