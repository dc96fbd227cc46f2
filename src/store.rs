//! The persisted transaction store.
//!
//! One JSON document holding every card's record, loaded whole at the start
//! of a run and rewritten whole on save. An absent file is an empty store; a
//! present-but-unreadable file is fatal, because silently starting from
//! empty would drop the prior contents on the next save.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{CardMetadata, CardRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// In-memory store of card records, keyed by card number.
#[derive(Debug, Default)]
pub struct TransactionStore {
    records: Vec<CardRecord>,
}

impl TransactionStore {
    /// Load the store document, treating an absent file as empty.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("store {} not found, starting empty", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { records })
    }

    /// Write the whole document atomically (temp file + rename), records
    /// sorted by card number so output is deterministic.
    pub fn save(&mut self, path: &Path) -> Result<(), StoreError> {
        self.records.sort_by(|a, b| a.card_no.cmp(&b.card_no));

        let json =
            serde_json::to_string_pretty(&self.records).map_err(StoreError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn record(&self, card_no: &str) -> Option<&CardRecord> {
        self.records.iter().find(|r| r.card_no == card_no)
    }

    pub fn record_mut(&mut self, card_no: &str) -> Option<&mut CardRecord> {
        self.records.iter_mut().find(|r| r.card_no == card_no)
    }

    /// Fetch the card's record, creating it from the metadata if missing and
    /// refreshing any metadata fields the registry supplies.
    pub fn upsert(&mut self, card_no: &str, metadata: &CardMetadata) -> &mut CardRecord {
        let index = match self.records.iter().position(|r| r.card_no == card_no) {
            Some(index) => {
                let record = &mut self.records[index];
                if metadata.head_of_family.is_some() {
                    record.head_of_family = metadata.head_of_family.clone();
                }
                if metadata.units.is_some() {
                    record.units = metadata.units;
                }
                index
            }
            None => {
                self.records.push(CardRecord {
                    card_no: card_no.to_string(),
                    head_of_family: metadata.head_of_family.clone(),
                    units: metadata.units,
                    transactions: Vec::new(),
                    last_updated: String::new(),
                });
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
