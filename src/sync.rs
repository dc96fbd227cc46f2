//! The batch coordinator.
//!
//! Fetch and parse fan out across a bounded worker pool; every merge into
//! the store happens afterwards on this task, in registry order, so the
//! final store content does not depend on which fetch finished first. One
//! card's failure never stops the others.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::config::SyncConfig;
use crate::fetch::PageFetcher;
use crate::portal;
use crate::reconcile::reconcile;
use crate::registry::CardEntry;
use crate::store::TransactionStore;
use crate::types::Transaction;

/// Outcome of one card's fetch+parse+reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Transactions found and reconciled.
    Synced(usize),
    /// Fetch worked but the period had no transactions (missing table or
    /// zero valid rows). Not an error.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CardOutcome {
    pub card_no: String,
    pub status: SyncStatus,
}

/// Per-card outcomes for a whole run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<CardOutcome>,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SyncStatus::Synced(_)))
            .count()
    }

    pub fn empty(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == SyncStatus::Empty)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SyncStatus::Failed(_)))
            .count()
    }
}

/// Fetch, parse, and reconcile every card in `cards` into `store`.
///
/// The store is mutated in memory only; the caller owns load and save. The
/// semaphore bounds concurrent fetches, and `batch_deadline` (when set)
/// aborts whatever is still in flight once it expires, keeping the merges
/// that already completed.
pub async fn sync_cards(
    config: &SyncConfig,
    fetcher: Arc<dyn PageFetcher>,
    cards: &[CardEntry],
    store: &mut TransactionStore,
) -> SyncReport {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let started = Instant::now();

    log::info!(
        "syncing {} cards for {} (concurrency {})",
        cards.len(),
        config.period,
        config.concurrency
    );

    let mut handles = Vec::with_capacity(cards.len());
    for card in cards {
        let semaphore = semaphore.clone();
        let fetcher = fetcher.clone();
        let card_no = card.card_no.clone();
        let period = config.period;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| "worker pool closed".to_string())?;

            let html = fetcher.fetch(&card_no).await.map_err(|e| e.to_string())?;
            // Parsing is synchronous and pure; nothing here crosses an await.
            Ok::<Vec<Transaction>, String>(portal::extract_transactions(&html, period))
        }));
    }

    let mut report = SyncReport::default();

    for (card, handle) in cards.iter().zip(handles) {
        let joined = match config.batch_deadline {
            None => Some(handle.await),
            Some(deadline) => match deadline.checked_sub(started.elapsed()) {
                Some(remaining) => {
                    let abort = handle.abort_handle();
                    match tokio::time::timeout(remaining, handle).await {
                        Ok(joined) => Some(joined),
                        Err(_) => {
                            abort.abort();
                            None
                        }
                    }
                }
                None => {
                    handle.abort();
                    None
                }
            },
        };

        let status = match joined {
            None => {
                log::warn!("card {}: batch deadline exceeded", card.card_no);
                SyncStatus::Failed("batch deadline exceeded".to_string())
            }
            Some(Err(join_err)) if join_err.is_cancelled() => {
                SyncStatus::Failed("batch deadline exceeded".to_string())
            }
            Some(Err(join_err)) => {
                log::warn!("card {}: worker panicked: {}", card.card_no, join_err);
                SyncStatus::Failed(format!("worker panicked: {join_err}"))
            }
            Some(Ok(Err(reason))) => {
                log::warn!("card {}: {}", card.card_no, reason);
                SyncStatus::Failed(reason)
            }
            Some(Ok(Ok(transactions))) => {
                let count = transactions.len();
                if count == 0 && !config.record_empty_fetches {
                    log::info!("card {}: no transactions for {}", card.card_no, config.period);
                    SyncStatus::Empty
                } else {
                    reconcile(
                        store,
                        &card.card_no,
                        &card.metadata(),
                        transactions,
                        config.policy,
                    );
                    if count == 0 {
                        log::info!(
                            "card {}: no transactions for {}, recorded",
                            card.card_no,
                            config.period
                        );
                        SyncStatus::Empty
                    } else {
                        log::info!("card {}: {} transactions", card.card_no, count);
                        SyncStatus::Synced(count)
                    }
                }
            }
        };

        report.outcomes.push(CardOutcome {
            card_no: card.card_no.clone(),
            status,
        });
    }

    log::info!(
        "sync finished: {} synced, {} empty, {} failed",
        report.synced(),
        report.empty(),
        report.failed()
    );

    report
}
