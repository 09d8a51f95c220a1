//! Account records and the keyed account table

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{EconomyRules, UserId};

/// One user's holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Spendable balance; at risk in wagers and robbery
    pub wallet: u64,
    /// Protected balance
    pub bank: u64,
    /// Consecutive successful daily claims
    #[serde(default)]
    pub daily_streak: u32,
    /// Most recent successful daily claim
    #[serde(
        rename = "last_daily",
        default,
        deserialize_with = "deserialize_claim_timestamp"
    )]
    pub last_daily_claim: Option<DateTime<Utc>>,
    /// Opaque item identifiers, carried untouched
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl Account {
    /// The record every user starts with.
    pub fn opening(rules: &EconomyRules) -> Self {
        Self {
            wallet: rules.starting_wallet,
            bank: 0,
            daily_streak: 0,
            last_daily_claim: None,
            inventory: Vec::new(),
        }
    }

    /// Wallet plus bank.
    pub fn total(&self) -> u64 {
        self.wallet.saturating_add(self.bank)
    }

    pub fn balance(&self) -> Balance {
        Balance {
            wallet: self.wallet,
            bank: self.bank,
            total: self.total(),
            daily_streak: self.daily_streak,
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::opening(&EconomyRules::default())
    }
}

/// Read-only view of an account's balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub wallet: u64,
    pub bank: u64,
    pub total: u64,
    pub daily_streak: u32,
}

/// Layout of the offset-less claim times found in older data files
/// (`2024-05-01T09:30:00.123456`). Those were written as local wall-clock time.
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepts RFC 3339 timestamps as well as offset-less ones, which are read as
/// UTC here. Stores that know the wall-clock offset of their data rewrite
/// offset-less values with [`parse_claim_timestamp`] before deserializing.
fn deserialize_claim_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_claim_timestamp(&s, Utc.fix()).map_err(serde::de::Error::custom))
        .transpose()
}

/// Parse a claim timestamp. Offset-less values are taken as wall-clock time
/// at `offset`.
pub fn parse_claim_timestamp(
    raw: &str,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let local = NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)?;
    Ok((local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc())
}

/// All accounts, ordered by user id so snapshots serialize stably.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountTable {
    accounts: BTreeMap<UserId, Account>,
}

impl AccountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: &UserId) -> Option<&Account> {
        self.accounts.get(user)
    }

    /// The user's account, built with `make` if absent. The flag is `true`
    /// when the record was just created.
    pub fn get_or_insert_with(
        &mut self,
        user: &UserId,
        make: impl FnOnce() -> Account,
    ) -> (&mut Account, bool) {
        match self.accounts.entry(user.clone()) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(make()), true),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Account)> {
        self.accounts.iter()
    }

    /// Sum of every wallet and bank in the table.
    pub fn total_supply(&self) -> u128 {
        self.accounts
            .values()
            .map(|a| a.wallet as u128 + a.bank as u128)
            .sum()
    }
}

impl FromIterator<(UserId, Account)> for AccountTable {
    fn from_iter<I: IntoIterator<Item = (UserId, Account)>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_default_account() {
        let account = Account::default();
        assert_eq!(account.wallet, 1000);
        assert_eq!(account.bank, 0);
        assert_eq!(account.daily_streak, 0);
        assert!(account.last_daily_claim.is_none());
        assert!(account.inventory.is_empty());
    }

    #[test]
    fn test_persisted_layout() {
        let table: AccountTable = [(UserId::from(7u64), Account::default())]
            .into_iter()
            .collect();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "7": {
                    "wallet": 1000,
                    "bank": 0,
                    "daily_streak": 0,
                    "last_daily": null,
                    "inventory": []
                }
            })
        );
    }

    #[test]
    fn test_reads_offsetless_timestamps() {
        let json = r#"{
            "wallet": 2050, "bank": 10, "daily_streak": 2,
            "last_daily": "2024-05-01T09:30:00.123456", "inventory": ["gem"]
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(account.last_daily_claim, Some(expected));
        assert_eq!(account.inventory, vec!["gem".to_string()]);

        let whole_seconds: Account = serde_json::from_str(
            r#"{"wallet": 1, "bank": 0, "daily_streak": 0, "last_daily": "2024-05-01T09:30:00", "inventory": []}"#,
        )
        .unwrap();
        assert_eq!(
            whole_seconds.last_daily_claim,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_rejects_garbage_timestamp() {
        let json = r#"{"wallet": 1, "bank": 0, "daily_streak": 0, "last_daily": "yesterday", "inventory": []}"#;
        assert!(serde_json::from_str::<Account>(json).is_err());
    }

    #[test]
    fn test_offsetless_timestamp_read_at_wall_clock_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let local = parse_claim_timestamp("2025-06-01T23:30:00", plus_two).unwrap();
        assert_eq!(local, Utc.with_ymd_and_hms(2025, 6, 1, 21, 30, 0).unwrap());

        let explicit = parse_claim_timestamp("2025-06-01T23:30:00+00:00", plus_two).unwrap();
        assert_eq!(explicit, Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap());
    }

    #[test]
    fn test_get_or_insert_with_creates_once() {
        let mut table = AccountTable::new();
        let user = UserId::from("alice");
        let (account, created) = table.get_or_insert_with(&user, Account::default);
        assert!(created);
        account.wallet = 5;

        let (account, created) = table.get_or_insert_with(&user, Account::default);
        assert!(!created);
        assert_eq!(account.wallet, 5);
        assert_eq!(table.len(), 1);
    }

    fn arb_account() -> impl Strategy<Value = Account> {
        (
            any::<u64>(),
            any::<u64>(),
            any::<u32>(),
            proptest::option::of(0i64..4_000_000_000_000_000),
            proptest::collection::vec("[a-z]{1,8}", 0..4),
        )
            .prop_map(|(wallet, bank, daily_streak, nanos, inventory)| Account {
                wallet,
                bank,
                daily_streak,
                last_daily_claim: nanos.map(|n| Utc.timestamp_nanos(n)),
                inventory,
            })
    }

    proptest! {
        #[test]
        fn prop_table_survives_json(
            entries in proptest::collection::vec(("[0-9]{1,19}", arb_account()), 0..8)
        ) {
            let table: AccountTable = entries
                .into_iter()
                .map(|(id, account)| (UserId::new(id), account))
                .collect();
            let json = serde_json::to_string_pretty(&table).unwrap();
            let reloaded: AccountTable = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(reloaded, table);
        }
    }
}
