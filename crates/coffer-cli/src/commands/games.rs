//! Daily reward, blackjack and robbery commands

use chrono::Utc;
use coffer_ledger::{
    DailyReward, Ledger, Outcome, RobberyResult, UserId, WagerOutcome, WagerResult,
};
use colored::*;

use super::report_failure;
use crate::display;

/// Claim today's reward
pub async fn daily(ledger: &Ledger, user: &UserId) -> bool {
    match ledger.claim_daily(user, Utc::now()).await {
        Ok(reward) => {
            show_daily(&reward);
            true
        }
        Err(err) => {
            if let Some(Outcome::Daily(reward)) = report_failure(&err) {
                show_daily(reward);
            }
            false
        }
    }
}

fn show_daily(reward: &DailyReward) {
    display::section("Daily Reward Claimed!");
    display::labeled("Amount", &display::money(reward.amount_awarded));
    display::labeled("Base", &display::money(reward.base));
    display::labeled("Streak Bonus", &display::money(reward.streak_bonus));
    display::labeled("New Balance", &display::money(reward.new_wallet));
    display::labeled("Streak", &format!("{} days", reward.new_streak));
}

/// Play one hand against the house
pub async fn blackjack(ledger: &Ledger, user: &UserId, bet: i64) -> bool {
    match ledger.wager_chance_game(user, bet).await {
        Ok(result) => {
            show_wager(&result);
            true
        }
        Err(err) => {
            if let Some(Outcome::Wager(result)) = report_failure(&err) {
                show_wager(result);
            }
            false
        }
    }
}

fn show_wager(result: &WagerResult) {
    let headline = match result.outcome {
        WagerOutcome::Blackjack => "BLACKJACK! You win 3:2!".bright_green(),
        WagerOutcome::Bust => "BUST! You lose.".bright_red(),
        WagerOutcome::HouseBust => "Dealer busts! You win!".bright_green(),
        WagerOutcome::Win => "You win!".bright_green(),
        WagerOutcome::Lose => "You lose.".bright_red(),
        WagerOutcome::Push => "Push! It's a tie.".yellow(),
    };

    display::section("Blackjack");
    display::labeled("Bet", &display::money(result.bet));
    display::labeled(
        "Your Hand",
        &format!(
            "{} + {} = {}",
            result.player_cards[0], result.player_cards[1], result.player_total
        ),
    );
    display::labeled(
        "Dealer's Hand",
        &format!(
            "{} + {} = {}",
            result.house_cards[0], result.house_cards[1], result.house_total
        ),
    );
    println!("  {}", headline.bold());
    display::labeled("Payout", &display::money(result.payout));
    display::labeled("New Balance", &display::money(result.new_wallet));
}

/// Try to rob another user
pub async fn rob(ledger: &Ledger, user: &UserId, target: &UserId) -> bool {
    match ledger.attempt_transfer(user, target).await {
        Ok(result) => {
            show_robbery(&result, target);
            true
        }
        Err(err) => {
            if let Some(Outcome::Robbery(result)) = report_failure(&err) {
                show_robbery(result, target);
            }
            false
        }
    }
}

fn show_robbery(result: &RobberyResult, target: &UserId) {
    if result.success {
        display::section("Successful Robbery!");
        display::success(&format!(
            "You stole {} from {}!",
            display::money(result.amount),
            target
        ));
        display::labeled("Your new balance", &display::money(result.actor_new_wallet));
        display::labeled("Their remaining", &display::money(result.target_new_wallet));
    } else {
        display::section("Caught Red-Handed!");
        display::error(&format!("You were caught trying to rob {}!", target));
        display::labeled("Fine", &display::money(result.fine));
        if result.fine_applied < result.fine {
            display::labeled("Collected", &display::money(result.fine_applied));
        }
        display::labeled("Your new balance", &display::money(result.actor_new_wallet));
    }
}
