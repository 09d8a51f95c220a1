//! The ledger engine: every business rule of the economy lives here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use coffer_store::{AccountStore, JsonFileStore};
use coffer_types::{
    Account, Balance, BankTransfer, DailyReward, EconomyRules, Outcome, RobberyResult,
    TransferDirection, UserId, WagerResult,
};
use tokio::sync::Mutex;

use crate::game::Deal;
use crate::{AccountBook, LedgerConfig, LedgerError, Randomness, Result, StdRandomness};

/// The Coffer ledger
///
/// Cheap to clone; clones share the same account book. All operations run
/// one at a time under a single lock that is held across the flush, so a
/// read-modify-persist sequence is never interleaved with another operation.
#[derive(Clone)]
pub struct Ledger {
    book: Arc<Mutex<AccountBook>>,
    randomness: Arc<dyn Randomness>,
    rules: Arc<EconomyRules>,
    utc_offset: FixedOffset,
    degraded: Arc<AtomicBool>,
}

impl Ledger {
    /// Open a ledger over `store`, drawing from an entropy-seeded RNG.
    ///
    /// Fails if the persisted table cannot be read; starting empty over
    /// unreadable data would silently discard every balance.
    pub async fn open(store: Arc<dyn AccountStore>, config: &LedgerConfig) -> Result<Self> {
        let book = AccountBook::open(store, config).await?;
        Ok(Self {
            rules: Arc::new(book.rules().clone()),
            book: Arc::new(Mutex::new(book)),
            randomness: Arc::new(StdRandomness::from_entropy()),
            utc_offset: config.utc_offset(),
            degraded: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Open a ledger backed by the JSON file named in `config`.
    ///
    /// The file stays locked while the ledger (or any clone of it) is alive;
    /// a second ledger on the same file is refused with
    /// [`StoreError::Locked`](coffer_store::StoreError::Locked).
    pub async fn open_file(config: &LedgerConfig) -> Result<Self> {
        let store =
            JsonFileStore::open(&config.data_file)?.with_legacy_offset(config.utc_offset());
        Self::open(Arc::new(store), config).await
    }

    /// Replace the randomness source
    pub fn with_randomness(mut self, randomness: Arc<dyn Randomness>) -> Self {
        self.randomness = randomness;
        self
    }

    pub fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// True while the most recent flush failed.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Return the user's account, creating and persisting the opening record
    /// if they have none.
    pub async fn get_or_create_account(&self, user: &UserId) -> Result<Account> {
        let mut book = self.book.lock().await;
        if let Some(account) = book.get(user) {
            return Ok(account.clone());
        }
        let account = book.get_or_create(user).clone();
        self.settle(&book, account, Outcome::Opened).await
    }

    /// Wallet, bank and total. Unknown users report the opening balance
    /// without being inserted.
    pub async fn get_balance(&self, user: &UserId) -> Balance {
        self.book.lock().await.view(user).balance()
    }

    /// Claim the daily reward.
    ///
    /// One claim per calendar day in the configured offset. The reward is
    /// `daily_base + streak * streak_bonus`; the streak grows by one per claim
    /// and is not reset by skipped days.
    pub async fn claim_daily(&self, user: &UserId, now: DateTime<Utc>) -> Result<DailyReward> {
        let mut book = self.book.lock().await;
        let mut account = book.view(user);

        let today = self.calendar_day(now);
        if let Some(last) = account.last_daily_claim {
            let last_day = self.calendar_day(last);
            // An earlier day means the clock moved backwards; refusing keeps
            // the claim timestamp monotone.
            if today <= last_day {
                return Err(LedgerError::AlreadyClaimed {
                    next_claim_at: self.start_of_next_day(last_day),
                });
            }
        }

        let (base, streak_bonus) = self
            .rules
            .daily_reward(account.daily_streak)
            .ok_or(LedgerError::BalanceOverflow)?;
        let amount_awarded = base + streak_bonus;
        let new_wallet = account
            .wallet
            .checked_add(amount_awarded)
            .ok_or(LedgerError::BalanceOverflow)?;
        let new_streak = account
            .daily_streak
            .checked_add(1)
            .ok_or(LedgerError::BalanceOverflow)?;

        account.wallet = new_wallet;
        account.daily_streak = new_streak;
        account.last_daily_claim = Some(now);
        book.put(user, account);

        tracing::info!(
            "{} claimed daily reward of {} (streak {})",
            user,
            amount_awarded,
            new_streak
        );

        let reward = DailyReward {
            amount_awarded,
            base,
            streak_bonus,
            new_streak,
            new_wallet,
            claimed_at: now,
        };
        self.settle(&book, reward, Outcome::Daily).await
    }

    /// Play one hand of the chance game for `bet` from the wallet.
    ///
    /// The wallet changes by exactly `payout - bet`, where
    /// `payout = floor(bet * multiplier)`.
    pub async fn wager_chance_game(&self, user: &UserId, bet: i64) -> Result<WagerResult> {
        if bet <= 0 {
            return Err(LedgerError::InvalidBet { bet });
        }
        let bet = bet as u64;

        let mut book = self.book.lock().await;
        let mut account = book.view(user);
        if account.wallet < bet {
            return Err(LedgerError::InsufficientFunds {
                available: account.wallet,
                required: bet,
            });
        }

        let deal = Deal::draw(self.randomness.as_ref());
        let outcome = deal.outcome();
        let payout = outcome.payout(bet).ok_or(LedgerError::BalanceOverflow)?;
        let new_wallet = (account.wallet - bet)
            .checked_add(payout)
            .ok_or(LedgerError::BalanceOverflow)?;

        account.wallet = new_wallet;
        book.put(user, account);

        tracing::info!(
            "{} wagered {}: {} ({} vs {}), payout {}",
            user,
            bet,
            outcome.label(),
            deal.player_total(),
            deal.house_total(),
            payout
        );

        let result = WagerResult {
            outcome,
            multiplier: outcome.multiplier(),
            player_cards: deal.player,
            house_cards: deal.house,
            player_total: deal.player_total(),
            house_total: deal.house_total(),
            bet,
            payout,
            new_wallet,
        };
        self.settle(&book, result, Outcome::Wager).await
    }

    /// Try to rob `target`'s wallet.
    ///
    /// On success an amount in `[steal_min, min(steal_max, target wallet)]`
    /// moves from target to actor, conserving their combined wallets. On
    /// failure the actor is fined; the fine is destroyed, not paid to anyone,
    /// and is clamped so the wallet stops at zero.
    pub async fn attempt_transfer(&self, actor: &UserId, target: &UserId) -> Result<RobberyResult> {
        if actor == target {
            return Err(LedgerError::SelfTargetNotAllowed);
        }

        let mut book = self.book.lock().await;
        let mut robber = book.view(actor);
        let mut victim = book.view(target);

        if victim.wallet < self.rules.rob_min_target_wallet {
            return Err(LedgerError::TargetTooPoor {
                wallet: victim.wallet,
                minimum: self.rules.rob_min_target_wallet,
            });
        }

        let result = if self.randomness.chance(self.rules.rob_success_chance) {
            let high = self.rules.rob_steal_max.min(victim.wallet);
            let low = self.rules.rob_steal_min.min(high);
            let amount = self.randomness.range(low, high).clamp(low, high);

            robber.wallet = robber
                .wallet
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
            victim.wallet -= amount;

            tracing::info!("{} robbed {} of {}", actor, target, amount);

            RobberyResult {
                success: true,
                amount,
                fine: 0,
                fine_applied: 0,
                actor_new_wallet: robber.wallet,
                target_new_wallet: victim.wallet,
            }
        } else {
            let fine = self
                .randomness
                .range(self.rules.rob_fine_min, self.rules.rob_fine_max);
            let fine_applied = fine.min(robber.wallet);
            robber.wallet -= fine_applied;

            tracing::info!(
                "{} was caught robbing {} and fined {} ({} applied)",
                actor,
                target,
                fine,
                fine_applied
            );

            RobberyResult {
                success: false,
                amount: 0,
                fine,
                fine_applied,
                actor_new_wallet: robber.wallet,
                target_new_wallet: victim.wallet,
            }
        };

        book.put(actor, robber);
        book.put(target, victim);
        self.settle(&book, result, Outcome::Robbery).await
    }

    /// Move `amount` from the wallet into the bank.
    pub async fn deposit(&self, user: &UserId, amount: i64) -> Result<BankTransfer> {
        self.move_funds(user, amount, TransferDirection::Deposit).await
    }

    /// Move `amount` from the bank into the wallet.
    pub async fn withdraw(&self, user: &UserId, amount: i64) -> Result<BankTransfer> {
        self.move_funds(user, amount, TransferDirection::Withdraw).await
    }

    async fn move_funds(
        &self,
        user: &UserId,
        amount: i64,
        direction: TransferDirection,
    ) -> Result<BankTransfer> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        let amount = amount as u64;

        let mut book = self.book.lock().await;
        let mut account = book.view(user);

        let (from, to) = match direction {
            TransferDirection::Deposit => (account.wallet, account.bank),
            TransferDirection::Withdraw => (account.bank, account.wallet),
        };
        if from < amount {
            return Err(LedgerError::InsufficientFunds {
                available: from,
                required: amount,
            });
        }
        let to = to.checked_add(amount).ok_or(LedgerError::BalanceOverflow)?;
        let from = from - amount;

        match direction {
            TransferDirection::Deposit => {
                account.wallet = from;
                account.bank = to;
            }
            TransferDirection::Withdraw => {
                account.bank = from;
                account.wallet = to;
            }
        }

        let transfer = BankTransfer {
            direction,
            amount,
            wallet: account.wallet,
            bank: account.bank,
        };
        book.put(user, account);

        tracing::info!("{} moved {} ({:?})", user, amount, direction);

        self.settle(&book, transfer, Outcome::Bank).await
    }

    /// Richest accounts first, by wallet plus bank; ties go to the lower id.
    pub async fn leaderboard(&self, limit: usize) -> Vec<(UserId, Balance)> {
        let book = self.book.lock().await;
        let mut rows: Vec<(UserId, Balance)> = book
            .table()
            .iter()
            .map(|(user, account)| (user.clone(), account.balance()))
            .collect();
        rows.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    }

    /// Number of accounts in the book
    pub async fn account_count(&self) -> usize {
        self.book.lock().await.len()
    }

    /// Sum of every wallet and bank
    pub async fn total_supply(&self) -> u128 {
        self.book.lock().await.table().total_supply()
    }

    /// Persist the book as it stands.
    pub async fn flush(&self) -> Result<()> {
        let book = self.book.lock().await;
        match book.flush().await {
            Ok(()) => {
                self.mark_persisted();
                Ok(())
            }
            Err(e) => {
                self.degraded.store(true, Ordering::SeqCst);
                Err(LedgerError::Storage(e))
            }
        }
    }

    /// Flush after a successful in-memory mutation. If persistence fails the
    /// mutation still stands, and the caller gets it back inside the error.
    async fn settle<T>(
        &self,
        book: &AccountBook,
        value: T,
        into_outcome: impl FnOnce(T) -> Outcome,
    ) -> Result<T> {
        match book.flush().await {
            Ok(()) => {
                self.mark_persisted();
                Ok(value)
            }
            Err(source) => {
                self.degraded.store(true, Ordering::SeqCst);
                tracing::error!(
                    "Persistence degraded: operation applied in memory but not saved: {}",
                    source
                );
                Err(LedgerError::PersistenceDegraded {
                    outcome: Box::new(into_outcome(value)),
                    source,
                })
            }
        }
    }

    fn mark_persisted(&self) {
        if self.degraded.swap(false, Ordering::SeqCst) {
            tracing::info!("Persistence recovered");
        }
    }

    fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset).date_naive()
    }

    fn start_of_next_day(&self, day: NaiveDate) -> DateTime<Utc> {
        let next = day.succ_opt().unwrap_or(day);
        next.and_time(NaiveTime::MIN).and_utc()
            - Duration::seconds(i64::from(self.utc_offset.local_minus_utc()))
    }
}
