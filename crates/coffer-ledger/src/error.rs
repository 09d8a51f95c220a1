//! Ledger error types

use chrono::{DateTime, Utc};
use coffer_store::StoreError;
use coffer_types::Outcome;
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid bet: {bet} (must be greater than zero)")]
    InvalidBet { bet: i64 },

    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("Daily reward already claimed; next claim opens at {next_claim_at}")]
    AlreadyClaimed { next_claim_at: DateTime<Utc> },

    #[error("Cannot rob yourself")]
    SelfTargetNotAllowed,

    #[error("Target is too poor to rob: wallet {wallet}, minimum {minimum}")]
    TargetTooPoor { wallet: u64, minimum: u64 },

    #[error("Balance overflow")]
    BalanceOverflow,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The operation took effect in memory but could not be persisted.
    #[error("Operation applied but not persisted: {source}")]
    PersistenceDegraded {
        outcome: Box<Outcome>,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// The in-memory result of an operation whose flush failed.
    pub fn applied_outcome(&self) -> Option<&Outcome> {
        match self {
            LedgerError::PersistenceDegraded { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
