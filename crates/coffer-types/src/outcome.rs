//! Records returned by ledger operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Account;

/// Result of a successful daily claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReward {
    pub amount_awarded: u64,
    pub base: u64,
    pub streak_bonus: u64,
    pub new_streak: u32,
    pub new_wallet: u64,
    pub claimed_at: DateTime<Utc>,
}

/// How a hand of the chance game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WagerOutcome {
    /// Player drew exactly 21
    Blackjack,
    /// Player went over 21
    Bust,
    /// House went over 21
    HouseBust,
    Win,
    Lose,
    Push,
}

impl WagerOutcome {
    /// Payout ratio as `(numerator, denominator)`.
    fn ratio(self) -> (u64, u64) {
        match self {
            Self::Blackjack => (5, 2),
            Self::HouseBust | Self::Win => (2, 1),
            Self::Push => (1, 1),
            Self::Bust | Self::Lose => (0, 1),
        }
    }

    pub fn multiplier(self) -> f64 {
        let (num, den) = self.ratio();
        num as f64 / den as f64
    }

    /// `floor(bet * multiplier)`, computed without floating point.
    pub fn payout(self, bet: u64) -> Option<u64> {
        let (num, den) = self.ratio();
        bet.checked_mul(num).map(|scaled| scaled / den)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blackjack => "blackjack",
            Self::Bust => "bust",
            Self::HouseBust => "house bust",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Push => "push",
        }
    }
}

/// Result of a settled wager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagerResult {
    pub outcome: WagerOutcome,
    pub multiplier: f64,
    pub player_cards: [u32; 2],
    pub house_cards: [u32; 2],
    pub player_total: u32,
    pub house_total: u32,
    pub bet: u64,
    pub payout: u64,
    pub new_wallet: u64,
}

impl WagerResult {
    /// Signed change applied to the wallet (`payout - bet`).
    pub fn net_change(&self) -> i128 {
        self.payout as i128 - self.bet as i128
    }
}

/// Result of a robbery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobberyResult {
    pub success: bool,
    /// Amount moved from target to actor (0 on failure)
    pub amount: u64,
    /// Nominal fine drawn on failure (0 on success)
    pub fine: u64,
    /// Fine actually taken after clamping at an empty wallet
    pub fine_applied: u64,
    pub actor_new_wallet: u64,
    pub target_new_wallet: u64,
}

/// Which way a wallet/bank move went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Wallet to bank
    Deposit,
    /// Bank to wallet
    Withdraw,
}

/// Result of moving funds between wallet and bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransfer {
    pub direction: TransferDirection,
    pub amount: u64,
    pub wallet: u64,
    pub bank: u64,
}

/// Any mutating operation's result.
///
/// Carried by degraded-persistence errors so callers can still report what
/// happened in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Opened(Account),
    Daily(DailyReward),
    Wager(WagerResult),
    Robbery(RobberyResult),
    Bank(BankTransfer),
}
