//! Extraction of transaction records from the portal's HTML.
//!
//! The lookup page is a soup of nested layout tables with no ids or classes;
//! the transaction table is found by its header labels, and its rows are
//! validated one by one. Everything in this module is a pure transformation
//! of page text.

pub mod row;
pub mod table;

use crate::types::{TargetPeriod, Transaction};

/// Extract all valid transactions for the target period from a raw page.
///
/// A page without the transaction table means the card has nothing to show;
/// that is an empty result, not an error.
pub fn extract_transactions(html: &str, period: TargetPeriod) -> Vec<Transaction> {
    match table::locate_transaction_table(html) {
        Some(found) => found
            .data_rows()
            .filter_map(|cells| row::parse_row(cells, period))
            .collect(),
        None => Vec::new(),
    }
}
