//! Coffer CLI - play the economy from a terminal
//!
//! Every invocation opens the ledger, runs one operation and exits.
//!
//! ```bash
//! coffer --user 42 daily
//! coffer --user 42 blackjack 250
//! coffer --user 42 rob 77
//! coffer leaderboard --limit 5
//! ```

mod commands;
mod display;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coffer_ledger::{Ledger, LedgerConfig, MemoryStore, StdRandomness, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Coffer - a persistent virtual-currency ledger
#[derive(Parser, Debug)]
#[command(name = "coffer", version, about = "Coffer - virtual currency ledger")]
struct Cli {
    /// Path of the persisted account table
    #[arg(long, global = true, env = "COFFER_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Keep accounts in memory only; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Seed the random source for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Offset from UTC, in minutes, that decides when a new day starts
    #[arg(
        long,
        global = true,
        env = "COFFER_UTC_OFFSET_MINUTES",
        allow_negative_numbers = true
    )]
    utc_offset_minutes: Option<i32>,

    /// Acting user id
    #[arg(long, short, global = true, env = "COFFER_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open an account for the acting user
    Open,

    /// Show wallet, bank and daily streak
    Balance,

    /// Claim the daily reward
    Daily,

    /// Play one hand of blackjack
    Blackjack {
        /// Amount to wager from the wallet
        #[arg(allow_negative_numbers = true)]
        bet: i64,
    },

    /// Try to rob another user
    Rob {
        /// User to rob
        target: String,
    },

    /// Move money from wallet to bank
    Deposit {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Move money from bank to wallet
    Withdraw {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Show the richest accounts
    Leaderboard {
        /// Number of rows to show
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = LedgerConfig::from_env();
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }
    if let Some(minutes) = cli.utc_offset_minutes {
        config.utc_offset_minutes = minutes;
    }

    let ledger = if cli.ephemeral {
        Ledger::open(Arc::new(MemoryStore::new()), &config).await
    } else {
        Ledger::open_file(&config).await
    }
    .with_context(|| format!("failed to open ledger at {}", config.data_file.display()))?;

    let ledger = match cli.seed {
        Some(seed) => ledger.with_randomness(Arc::new(StdRandomness::seeded(seed))),
        None => ledger,
    };

    let user = UserId::new(cli.user);
    let ok = match cli.command {
        Commands::Open => commands::account::open(&ledger, &user).await,
        Commands::Balance => commands::account::balance(&ledger, &user).await,
        Commands::Daily => commands::games::daily(&ledger, &user).await,
        Commands::Blackjack { bet } => commands::games::blackjack(&ledger, &user, bet).await,
        Commands::Rob { target } => {
            commands::games::rob(&ledger, &user, &UserId::new(target)).await
        }
        Commands::Deposit { amount } => commands::account::deposit(&ledger, &user, amount).await,
        Commands::Withdraw { amount } => {
            commands::account::withdraw(&ledger, &user, amount).await
        }
        Commands::Leaderboard { limit } => commands::account::leaderboard(&ledger, limit).await,
    };

    println!();
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
