//! Merging fetched batches into the store.
//!
//! Mutates the in-memory store only; persistence is the coordinator's job.
//! Policies are commutative across distinct cards, so merge order between
//! cards never changes the final store content.

use crate::store::TransactionStore;
use crate::types::{CardMetadata, MergePolicy, Transaction};

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local-time stamp written to `LAST_UPDATED` on every reconciliation.
pub fn now_stamp() -> String {
    chrono::Local::now().format(STAMP_FORMAT).to_string()
}

/// Merge `new_transactions` into the card's record under the given policy.
///
/// A card not yet in the store gets a fresh record with the supplied
/// metadata; for a fresh record both policies amount to "set contents"
/// (append-dedup still collapses duplicates within the batch itself).
/// The card's `LAST_UPDATED` stamp is refreshed unconditionally.
pub fn reconcile(
    store: &mut TransactionStore,
    card_no: &str,
    metadata: &CardMetadata,
    new_transactions: Vec<Transaction>,
    policy: MergePolicy,
) {
    let record = store.upsert(card_no, metadata);

    match policy {
        MergePolicy::SnapshotReplace => {
            record.transactions = new_transactions;
        }
        MergePolicy::AppendDedup => {
            for tx in new_transactions {
                if !record.transactions.contains(&tx) {
                    record.transactions.push(tx);
                }
            }
        }
    }

    record.last_updated = now_stamp();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transaction;
    use chrono::NaiveDate;

    fn tx(sl_no: u32, day: u32) -> Transaction {
        Transaction {
            sl_no,
            member: "Jane Doe".to_string(),
            availed_fps: "FPS12".to_string(),
            allotted_month: "September".to_string(),
            allotted_year: 2025,
            avail_date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            avail_type: "Normal".to_string(),
            sugar_kg: 2500.0,
            rice_kg: 10.0,
        }
    }

    fn metadata() -> CardMetadata {
        CardMetadata {
            head_of_family: Some("R. Kumar".to_string()),
            units: Some(4),
        }
    }

    #[test]
    fn test_fresh_card_gets_record_with_metadata_and_stamp() {
        let mut store = TransactionStore::default();
        reconcile(
            &mut store,
            "9999",
            &metadata(),
            vec![tx(1, 5)],
            MergePolicy::SnapshotReplace,
        );

        assert_eq!(store.len(), 1);
        let record = store.record("9999").unwrap();
        assert_eq!(record.head_of_family.as_deref(), Some("R. Kumar"));
        assert_eq!(record.units, Some(4));
        assert_eq!(record.transactions, vec![tx(1, 5)]);
        assert!(!record.last_updated.is_empty());
        // Stamp shape: "YYYY-MM-DD HH:MM:SS"
        assert_eq!(record.last_updated.len(), 19);
        assert_eq!(&record.last_updated[4..5], "-");
        assert_eq!(&record.last_updated[10..11], " ");
    }

    #[test]
    fn test_snapshot_replace_keeps_only_latest_batch() {
        let mut store = TransactionStore::default();
        let batch_a = vec![tx(1, 1), tx(2, 2)];
        let batch_b = vec![tx(3, 3)];

        reconcile(
            &mut store,
            "100",
            &metadata(),
            batch_a,
            MergePolicy::SnapshotReplace,
        );
        reconcile(
            &mut store,
            "100",
            &metadata(),
            batch_b.clone(),
            MergePolicy::SnapshotReplace,
        );

        assert_eq!(store.record("100").unwrap().transactions, batch_b);
    }

    #[test]
    fn test_snapshot_replace_drops_retracted_rows() {
        let mut store = TransactionStore::default();
        reconcile(
            &mut store,
            "100",
            &metadata(),
            vec![tx(1, 1), tx(2, 2)],
            MergePolicy::SnapshotReplace,
        );
        // Upstream retracted row 2.
        reconcile(
            &mut store,
            "100",
            &metadata(),
            vec![tx(1, 1)],
            MergePolicy::SnapshotReplace,
        );

        assert_eq!(store.record("100").unwrap().transactions, vec![tx(1, 1)]);
    }

    #[test]
    fn test_append_dedup_is_idempotent() {
        let mut store = TransactionStore::default();
        let batch = vec![tx(1, 1), tx(2, 2)];

        reconcile(
            &mut store,
            "100",
            &metadata(),
            batch.clone(),
            MergePolicy::AppendDedup,
        );
        let after_first = store.record("100").unwrap().transactions.clone();

        reconcile(
            &mut store,
            "100",
            &metadata(),
            batch,
            MergePolicy::AppendDedup,
        );
        let after_second = store.record("100").unwrap().transactions.clone();

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_append_dedup_preserves_existing_rows_and_order() {
        let mut store = TransactionStore::default();
        reconcile(
            &mut store,
            "100",
            &metadata(),
            vec![tx(1, 1), tx(2, 2)],
            MergePolicy::AppendDedup,
        );
        // Next month's fetch: one repeat, one new.
        reconcile(
            &mut store,
            "100",
            &metadata(),
            vec![tx(2, 2), tx(3, 3)],
            MergePolicy::AppendDedup,
        );

        assert_eq!(
            store.record("100").unwrap().transactions,
            vec![tx(1, 1), tx(2, 2), tx(3, 3)]
        );
    }

    #[test]
    fn test_append_dedup_collapses_duplicates_within_a_batch() {
        let mut store = TransactionStore::default();
        reconcile(
            &mut store,
            "100",
            &metadata(),
            vec![tx(1, 1), tx(1, 1)],
            MergePolicy::AppendDedup,
        );
        assert_eq!(store.record("100").unwrap().transactions, vec![tx(1, 1)]);
    }

    #[test]
    fn test_distinct_cards_merge_commutatively() {
        let mut forward = TransactionStore::default();
        reconcile(&mut forward, "100", &metadata(), vec![tx(1, 1)], MergePolicy::SnapshotReplace);
        reconcile(&mut forward, "200", &metadata(), vec![tx(2, 2)], MergePolicy::SnapshotReplace);

        let mut reverse = TransactionStore::default();
        reconcile(&mut reverse, "200", &metadata(), vec![tx(2, 2)], MergePolicy::SnapshotReplace);
        reconcile(&mut reverse, "100", &metadata(), vec![tx(1, 1)], MergePolicy::SnapshotReplace);

        assert_eq!(
            forward.record("100").unwrap().transactions,
            reverse.record("100").unwrap().transactions
        );
        assert_eq!(
            forward.record("200").unwrap().transactions,
            reverse.record("200").unwrap().transactions
        );
    }
}
