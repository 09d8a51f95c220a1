//! In-memory account store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use coffer_types::AccountTable;
use parking_lot::RwLock;

use crate::{AccountStore, StoreResult};

/// Keeps the latest snapshot in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: RwLock<AccountTable>,
    saves: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing table, as if it had been persisted earlier.
    pub fn with_table(table: AccountTable) -> Self {
        Self {
            snapshot: RwLock::new(table),
            saves: AtomicU64::new(0),
        }
    }

    /// Copy of the last saved table
    pub fn snapshot(&self) -> AccountTable {
        self.snapshot.read().clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn load(&self) -> StoreResult<AccountTable> {
        Ok(self.snapshot.read().clone())
    }

    async fn save(&self, table: &AccountTable) -> StoreResult<()> {
        *self.snapshot.write() = table.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
