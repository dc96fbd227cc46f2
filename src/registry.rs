//! The card registry.
//!
//! A `cards.json` document listing every card to sync, read wholesale before
//! a batch run. Field names follow the registry export format.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::CardMetadata;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("registry {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One registry row: the card number plus whatever descriptive fields the
/// export carries.
#[derive(Debug, Clone, Deserialize)]
pub struct CardEntry {
    #[serde(rename = "CARDNO")]
    pub card_no: String,
    #[serde(rename = "HEAD_OF_THE_FAMILY", default)]
    pub head_of_family: Option<String>,
    #[serde(rename = "UNITS", default)]
    pub units: Option<u32>,
}

impl CardEntry {
    /// An entry carrying nothing but the card number, for single-card runs.
    pub fn bare(card_no: String) -> Self {
        Self {
            card_no,
            head_of_family: None,
            units: None,
        }
    }

    pub fn metadata(&self) -> CardMetadata {
        CardMetadata {
            head_of_family: self.head_of_family.clone(),
            units: self.units,
        }
    }
}

/// Load the registry document.
pub fn load_cards(path: &Path) -> Result<Vec<CardEntry>, RegistryError> {
    let raw = fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
