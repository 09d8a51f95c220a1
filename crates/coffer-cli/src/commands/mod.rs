//! Command handlers. Each one calls a single ledger operation and renders
//! the result; none of them touch balances directly.

pub mod account;
pub mod games;

use coffer_ledger::{LedgerError, Outcome};

use crate::display;

/// Render a ledger failure. Hands back the in-memory outcome when the
/// operation took effect but could not be persisted.
pub fn report_failure(err: &LedgerError) -> Option<&Outcome> {
    match err {
        LedgerError::PersistenceDegraded { .. } => {
            display::warning(&format!("{} - the change is live but may be lost on restart", err));
            err.applied_outcome()
        }
        LedgerError::AlreadyClaimed { next_claim_at } => {
            display::error(&format!(
                "You've already claimed your daily credits today. Come back after {}.",
                next_claim_at.format("%Y-%m-%d %H:%M UTC")
            ));
            None
        }
        LedgerError::InsufficientFunds { available, .. } => {
            display::error(&format!(
                "Insufficient funds: you only have {}.",
                display::money(*available)
            ));
            None
        }
        LedgerError::TargetTooPoor { minimum, .. } => {
            display::error(&format!(
                "They don't have enough cash to rob (minimum {}).",
                display::money(*minimum)
            ));
            None
        }
        other => {
            display::error(&other.to_string());
            None
        }
    }
}
