//! Command-line entry point.
//!
//! Reads its configuration from the environment, syncs either the whole
//! registry or the single card pinned by `CARDNO`, and prints a per-card
//! summary. Only a broken store (or config/registry) fails the run; a batch
//! where every card errored still exits cleanly with its failures reported.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use epos_sync::config::SyncConfig;
use epos_sync::fetch::HttpFetcher;
use epos_sync::registry::{self, CardEntry};
use epos_sync::store::TransactionStore;
use epos_sync::sync::{sync_cards, SyncStatus};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = SyncConfig::from_env()?;

    let cards: Vec<CardEntry> = match &config.card_no {
        Some(card_no) => vec![CardEntry::bare(card_no.clone())],
        None => registry::load_cards(&config.cards_path)?,
    };
    if cards.is_empty() {
        println!("no cards to sync");
        return Ok(());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.base_url, config.fetch_timeout)?);

    let mut store = TransactionStore::load(&config.store_path)?;
    let report = sync_cards(&config, fetcher, &cards, &mut store).await;
    store.save(&config.store_path)?;

    for outcome in &report.outcomes {
        match &outcome.status {
            SyncStatus::Synced(count) => {
                println!("{}: {} transactions for {}", outcome.card_no, count, config.period)
            }
            SyncStatus::Empty => {
                println!("{}: no transactions for {}", outcome.card_no, config.period)
            }
            SyncStatus::Failed(reason) => {
                println!("{}: failed ({})", outcome.card_no, reason)
            }
        }
    }
    println!(
        "{} synced, {} empty, {} failed -> {}",
        report.synced(),
        report.empty(),
        report.failed(),
        config.store_path.display()
    );

    Ok(())
}
