//! Balance, bank and leaderboard commands

use coffer_ledger::{BankTransfer, Ledger, Outcome, TransferDirection, UserId};
use colored::*;

use super::report_failure;
use crate::display;

/// Open an account (idempotent) and show it
pub async fn open(ledger: &Ledger, user: &UserId) -> bool {
    match ledger.get_or_create_account(user).await {
        Ok(account) => {
            display::success(&format!("Account ready for {}", user));
            display::labeled("Wallet", &display::money(account.wallet));
            true
        }
        Err(err) => {
            if let Some(Outcome::Opened(account)) = report_failure(&err) {
                display::labeled("Wallet", &display::money(account.wallet));
            }
            false
        }
    }
}

/// Show wallet, bank and streak
pub async fn balance(ledger: &Ledger, user: &UserId) -> bool {
    let balance = ledger.get_balance(user).await;

    display::section("Financial Report");
    display::labeled("Account Holder", user.as_str());
    display::labeled("Wallet", &display::money(balance.wallet));
    display::labeled("Bank", &display::money(balance.bank));
    display::labeled("Total", &display::money(balance.total));
    println!(
        "  {}",
        format!("Daily streak: {} days", balance.daily_streak).bright_black()
    );
    true
}

/// Move funds from wallet to bank
pub async fn deposit(ledger: &Ledger, user: &UserId, amount: i64) -> bool {
    render_transfer(ledger.deposit(user, amount).await)
}

/// Move funds from bank to wallet
pub async fn withdraw(ledger: &Ledger, user: &UserId, amount: i64) -> bool {
    render_transfer(ledger.withdraw(user, amount).await)
}

fn render_transfer(result: coffer_ledger::Result<BankTransfer>) -> bool {
    match result {
        Ok(transfer) => {
            show_transfer(&transfer);
            true
        }
        Err(err) => {
            if let Some(Outcome::Bank(transfer)) = report_failure(&err) {
                show_transfer(transfer);
            }
            false
        }
    }
}

fn show_transfer(transfer: &BankTransfer) {
    let verb = match transfer.direction {
        TransferDirection::Deposit => "Deposited",
        TransferDirection::Withdraw => "Withdrew",
    };
    display::success(&format!("{} {}", verb, display::money(transfer.amount)));
    display::labeled("Wallet", &display::money(transfer.wallet));
    display::labeled("Bank", &display::money(transfer.bank));
}

/// Show the richest accounts
pub async fn leaderboard(ledger: &Ledger, limit: usize) -> bool {
    let rows = ledger.leaderboard(limit).await;

    display::section("Leaderboard");
    if rows.is_empty() {
        println!("  No accounts yet.");
        return true;
    }
    for (rank, (user, balance)) in rows.iter().enumerate() {
        println!(
            "  {:>3}. {:<24} {}",
            rank + 1,
            user.as_str(),
            display::money(balance.total).bright_cyan()
        );
    }
    true
}
