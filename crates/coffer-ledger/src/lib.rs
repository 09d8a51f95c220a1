//! Coffer Ledger - Per-user currency ledger and wagering engine
//!
//! The ledger is:
//! - Account-keyed by `UserId`, with lazily created default accounts
//! - Split into a spendable wallet and a protected bank
//! - Persisted after every mutating operation
//! - Serialized: one operation at a time touches the account book
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Currency is only created by daily claims and only destroyed by robbery fines
//! 3. At most one daily claim per calendar day per account
//! 4. Failed operations leave no partial mutation behind
//!
//! # Layering
//!
//! ```text
//! command surface → Ledger → AccountBook → AccountStore
//! ```

pub mod book;
pub mod config;
pub mod error;
pub mod game;
pub mod ledger;
pub mod random;

pub use book::AccountBook;
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use random::{Randomness, ScriptedRandomness, StdRandomness};

pub use coffer_store::{AccountStore, JsonFileStore, MemoryStore, StoreError};
pub use coffer_types::*;
