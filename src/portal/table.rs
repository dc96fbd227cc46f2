//! Locating the transaction table inside the lookup page.
//!
//! The page renders several tables (navigation, card summary, transactions)
//! and the transaction table's header region spans three physical rows of
//! merged and duplicated label cells. Header rows and data rows are visually
//! but not structurally distinguishable, so the data-row offset is fixed
//! layout knowledge rather than something detected per page.

use scraper::{Html, Selector};

/// Cell texts that identify the transaction table. A table qualifies when
/// its trimmed cell texts are a superset of this signature.
pub const HEADER_SIGNATURE: &[&str] = &["Sl.No", "Avail. Date"];

/// Physical header rows to skip before data begins.
pub const DATA_ROW_OFFSET: usize = 3;

/// The located transaction table, reduced to trimmed cell texts.
#[derive(Debug, Clone)]
pub struct TransactionTable {
    rows: Vec<Vec<String>>,
    data_row_offset: usize,
}

impl TransactionTable {
    /// Rows past the header region, in document order.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().skip(self.data_row_offset).map(Vec::as_slice)
    }

    /// All physical rows, header region included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Scan the document's tables in order and return the first whose cell
/// texts cover the header signature.
///
/// `None` means the page has no transaction table, which the portal renders
/// for cards with nothing to show; callers treat it as an empty result.
pub fn locate_transaction_table(html: &str) -> Option<TransactionTable> {
    let document = Html::parse_document(html);
    let tables = Selector::parse("table").ok()?;
    let table_rows = Selector::parse("tr").ok()?;
    let cells = Selector::parse("th, td").ok()?;

    for table in document.select(&tables) {
        let rows: Vec<Vec<String>> = table
            .select(&table_rows)
            .map(|tr| {
                tr.select(&cells)
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .collect()
            })
            .collect();

        let signature_covered = HEADER_SIGNATURE
            .iter()
            .all(|label| rows.iter().flatten().any(|cell| cell == label));

        if signature_covered {
            return Some(TransactionTable {
                rows,
                data_row_offset: DATA_ROW_OFFSET,
            });
        }
    }

    None
}
