//! Core data types shared across the sync pipeline.
//!
//! Serialized field names match the store document produced by earlier
//! versions of this tool, so an existing `transactions.json` keeps loading.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Transactions
// ============================================================================

/// One disbursal event for a ration card in a given period.
///
/// Structural equality (all nine fields) is what the append-dedup merge
/// policy compares; there is no synthetic ID on the portal side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "SlNo")]
    pub sl_no: u32,
    #[serde(rename = "Member")]
    pub member: String,
    #[serde(rename = "AvailedFPS")]
    pub availed_fps: String,
    #[serde(rename = "AllottedMonth")]
    pub allotted_month: String,
    #[serde(rename = "AllottedYear")]
    pub allotted_year: i32,
    /// Serialized as `YYYY-MM-DD`.
    #[serde(rename = "AvailDate")]
    pub avail_date: NaiveDate,
    #[serde(rename = "AvailType")]
    pub avail_type: String,
    #[serde(rename = "SugarKG")]
    pub sugar_kg: f64,
    #[serde(rename = "RiceKG")]
    pub rice_kg: f64,
}

// ============================================================================
// Card records
// ============================================================================

/// The persisted per-card unit in the store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "CARDNO")]
    pub card_no: String,
    #[serde(
        rename = "HEAD_OF_THE_FAMILY",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub head_of_family: Option<String>,
    #[serde(rename = "UNITS", default, skip_serializing_if = "Option::is_none")]
    pub units: Option<u32>,
    #[serde(rename = "MONTHLY_TRANSACTIONS", default)]
    pub transactions: Vec<Transaction>,
    /// `YYYY-MM-DD HH:MM:SS`, local time of the last reconciliation.
    #[serde(rename = "LAST_UPDATED", default)]
    pub last_updated: String,
}

/// Descriptive card metadata sourced from the registry document.
///
/// Opaque to the sync core; carried into the store verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardMetadata {
    pub head_of_family: Option<String>,
    pub units: Option<u32>,
}

// ============================================================================
// Target period
// ============================================================================

/// The (month, year) reporting window a fetch batch filters against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPeriod {
    month: u32,
    year: i32,
}

impl TargetPeriod {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Whether a calendar date falls inside this reporting window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }
}

impl std::fmt::Display for TargetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

// ============================================================================
// Merge policy
// ============================================================================

/// How a freshly fetched batch merges into a card's stored transactions.
///
/// Both behaviors exist in the field: a current-month snapshot that must not
/// keep stale rows, and a rolling history that must never lose old rows.
/// The caller picks one per run; nothing is auto-detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Replace the card's whole transaction list with the new batch.
    #[default]
    SnapshotReplace,
    /// Append only transactions with no structural match in the existing
    /// list; never remove or reorder what is already stored.
    AppendDedup,
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" | "snapshot-replace" => Ok(MergePolicy::SnapshotReplace),
            "append" | "append-dedup" => Ok(MergePolicy::AppendDedup),
            other => Err(format!("unknown merge policy {other:?}")),
        }
    }
}
