//! Coffer Types - Data model for the per-user currency ledger
//!
//! This crate has zero dependencies on other coffer crates. It defines:
//!
//! - `UserId`, the stable key of every account
//! - `Account` and `AccountTable`, the persisted state
//! - `EconomyRules`, the constants behind rewards, wagers and robbery
//! - Outcome records returned by ledger operations
//!
//! # Invariants
//!
//! 1. Wallet and bank are unsigned and never go below zero
//! 2. An account is created with the default record exactly once
//! 3. `last_daily_claim` only moves forward in time

pub mod identity;
pub mod account;
pub mod rules;
pub mod outcome;

pub use identity::*;
pub use account::*;
pub use rules::*;
pub use outcome::*;
