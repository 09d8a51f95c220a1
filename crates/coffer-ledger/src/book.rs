//! In-memory account book over a persistent store.

use std::sync::Arc;
use std::time::Duration;

use coffer_store::{AccountStore, StoreResult};
use coffer_types::{Account, AccountTable, EconomyRules, UserId};

use crate::LedgerConfig;

/// The single choke-point between ledger logic and persistence.
///
/// Loaded once at startup; every mutating ledger operation ends with
/// [`AccountBook::flush`], so there is no deferred-write window.
pub struct AccountBook {
    table: AccountTable,
    store: Arc<dyn AccountStore>,
    rules: EconomyRules,
    flush_attempts: u32,
    flush_backoff: Duration,
}

impl AccountBook {
    /// Load the persisted table from `store`.
    pub async fn open(store: Arc<dyn AccountStore>, config: &LedgerConfig) -> StoreResult<Self> {
        let table = store.load().await?;
        tracing::info!("Opened account book with {} accounts from {}", table.len(), store.describe());
        Ok(Self {
            table,
            store,
            rules: config.rules.clone(),
            flush_attempts: config.flush_attempts.max(1),
            flush_backoff: Duration::from_millis(config.flush_backoff_ms),
        })
    }

    pub fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// Existing account, if any. Never inserts.
    pub fn get(&self, user: &UserId) -> Option<&Account> {
        self.table.get(user)
    }

    /// Copy of the user's account, or of the opening record if they have none
    /// yet. Never inserts.
    pub fn view(&self, user: &UserId) -> Account {
        self.table
            .get(user)
            .cloned()
            .unwrap_or_else(|| Account::opening(&self.rules))
    }

    /// Return the user's account, creating the opening record first if absent.
    pub fn get_or_create(&mut self, user: &UserId) -> &mut Account {
        let rules = &self.rules;
        let (account, created) = self
            .table
            .get_or_insert_with(user, || Account::opening(rules));
        if created {
            tracing::info!("Opened account for {}", user);
        }
        account
    }

    /// Overwrite (or create) the user's account with `account`.
    pub fn put(&mut self, user: &UserId, account: Account) {
        *self.get_or_create(user) = account;
    }

    pub fn table(&self) -> &AccountTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Persist the whole table, retrying a bounded number of times.
    pub async fn flush(&self) -> StoreResult<()> {
        let mut attempt = 1;
        loop {
            match self.store.save(&self.table).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.flush_attempts => {
                    tracing::warn!(
                        "Flush attempt {}/{} to {} failed: {}",
                        attempt,
                        self.flush_attempts,
                        self.store.describe(),
                        e
                    );
                    tokio::time::sleep(self.flush_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_store::MemoryStore;

    async fn open_book(store: Arc<MemoryStore>) -> AccountBook {
        AccountBook::open(store, &LedgerConfig::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_once() {
        let mut book = open_book(Arc::new(MemoryStore::new())).await;
        let user = UserId::from(1u64);

        book.get_or_create(&user).wallet = 42;
        let account = book.get_or_create(&user);

        assert_eq!(account.wallet, 42);
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn test_view_does_not_insert() {
        let book = open_book(Arc::new(MemoryStore::new())).await;
        let user = UserId::from(1u64);

        assert_eq!(book.view(&user), Account::default());
        assert!(book.get(&user).is_none());
    }

    #[tokio::test]
    async fn test_opening_record_follows_rules() {
        let config = LedgerConfig {
            rules: EconomyRules {
                starting_wallet: 250,
                ..EconomyRules::default()
            },
            ..LedgerConfig::default()
        };
        let mut book = AccountBook::open(Arc::new(MemoryStore::new()), &config)
            .await
            .unwrap();

        assert_eq!(book.get_or_create(&UserId::from("x")).wallet, 250);
    }

    #[tokio::test]
    async fn test_flush_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let mut book = open_book(store.clone()).await;
        book.get_or_create(&UserId::from(9u64));

        book.flush().await.unwrap();

        assert_eq!(store.snapshot(), *book.table());
        assert_eq!(store.save_count(), 1);
    }
}
