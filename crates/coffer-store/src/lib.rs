//! Coffer Account Store
//!
//! Durable persistence of the whole account table as a single keyed
//! collection. The table is read once at startup and replaced wholesale on
//! every flush.
//!
//! # Backends
//!
//! - **JsonFileStore**: one pretty-printed JSON file, replaced atomically
//! - **MemoryStore**: in-process snapshot for tests and throwaway sessions

pub mod error;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use coffer_types::AccountTable;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Load/save primitive behind the account book.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read the persisted table. A store with no prior state yields an empty
    /// table; unreadable or malformed state is an error.
    async fn load(&self) -> StoreResult<AccountTable>;

    /// Replace the persisted table with `table`.
    ///
    /// A concurrent `load` observes either the previous snapshot or this one,
    /// never a partial write.
    async fn save(&self, table: &AccountTable) -> StoreResult<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
