//! File-backed account store.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use coffer_types::{parse_claim_timestamp, AccountTable};
use fs2::FileExt;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{AccountStore, StoreError, StoreResult};

/// Stores the account table as one pretty-printed JSON object keyed by user id.
///
/// # Crash safety
///
/// Saves go to `<file>.tmp`, are fsynced, then renamed over the target, so
/// readers only ever see a complete snapshot.
///
/// # Exclusive access
///
/// The store holds an advisory lock on `<file>.lock` until it is dropped.
/// Each writer rewrites the whole table, so a second process working on the
/// same file would silently discard the first one's updates.
pub struct JsonFileStore {
    path: PathBuf,
    legacy_offset: FixedOffset,
    _lock: File,
}

impl JsonFileStore {
    /// Open the store at `path`, creating missing parent directories and
    /// taking the lock. Fails with [`StoreError::Locked`] if another store
    /// already holds it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let lock_path = sibling(&path, ".lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        if let Err(e) = lock.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(StoreError::Locked { path });
            }
            return Err(StoreError::io(&lock_path, e));
        }

        tracing::debug!("Locked {}", lock_path.display());

        Ok(Self {
            path,
            legacy_offset: Utc.fix(),
            _lock: lock,
        })
    }

    /// Wall-clock offset of claim times stored without one. Defaults to UTC.
    pub fn with_legacy_offset(mut self, offset: FixedOffset) -> Self {
        self.legacy_offset = offset;
        self
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    async fn write_temp(&self, temp: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut file = fs::File::create(temp)
            .await
            .map_err(|e| StoreError::io(temp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::io(temp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(temp, e))
    }

    /// Rewrite offset-less `last_daily` values as RFC 3339 at the legacy offset.
    fn localize_legacy_claims(&self, raw: &mut Value) {
        let Some(accounts) = raw.as_object_mut() else {
            return;
        };
        for account in accounts.values_mut() {
            let Some(Value::String(claimed)) = account.get_mut("last_daily") else {
                continue;
            };
            if DateTime::parse_from_rfc3339(claimed).is_ok() {
                continue;
            }
            // Unparseable values are left for the typed decode to reject.
            if let Ok(at) = parse_claim_timestamp(claimed, self.legacy_offset) {
                *claimed = at.to_rfc3339();
            }
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl AccountStore for JsonFileStore {
    async fn load(&self) -> StoreResult<AccountTable> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No account file at {}, starting empty", self.path.display());
                return Ok(AccountTable::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let corrupt = |source: serde_json::Error| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        };
        let mut raw: Value = serde_json::from_slice(&bytes).map_err(corrupt)?;
        self.localize_legacy_claims(&mut raw);
        let table: AccountTable = serde_json::from_value(raw).map_err(corrupt)?;

        tracing::debug!("Loaded {} accounts from {}", table.len(), self.path.display());

        Ok(table)
    }

    async fn save(&self, table: &AccountTable) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(table)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.temp_path();
        if let Err(e) = self.write_temp(&temp, &bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        // Atomic rename
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::io(&self.path, e));
        }

        tracing::debug!("Saved {} accounts to {}", table.len(), self.path.display());

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
