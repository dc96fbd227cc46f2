//! Runtime configuration for a sync run.
//!
//! Every tunable the tool once kept as a hard-coded constant is a field
//! here; `from_env()` assembles the whole value up front so the rest of the
//! pipeline never touches the environment.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Datelike;

use crate::types::{MergePolicy, TargetPeriod};

/// Portal endpoint; the card number is appended to the query string.
pub const DEFAULT_BASE_URL: &str = "https://aepos.ap.gov.in/Qcodesearch.jsp?rcno=";

fn default_concurrency() -> usize {
    20
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Configuration errors are fatal at startup; nothing is silently defaulted
/// once a variable is present but malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything a sync run needs to know, resolved before any I/O starts.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// URL prefix the card number is appended to.
    pub base_url: String,
    /// Reporting window applied to every card in the run.
    pub period: TargetPeriod,
    /// Worker pool width for the fetch+parse stage.
    pub concurrency: usize,
    pub policy: MergePolicy,
    /// Per-request bound on a portal fetch.
    pub fetch_timeout: Duration,
    /// Optional bound on the whole batch; cards still in flight when it
    /// expires are reported failed and already-merged results are kept.
    pub batch_deadline: Option<Duration>,
    /// When false, a fetch that yields zero transactions leaves the card's
    /// prior record and timestamp untouched. When true, the empty result is
    /// reconciled like any other, which under snapshot-replace clears the
    /// card's list for the period.
    pub record_empty_fetches: bool,
    /// Store document path.
    pub store_path: PathBuf,
    /// Card registry document path, used when no single card is pinned.
    pub cards_path: PathBuf,
    /// Restrict the run to one card number, skipping the registry file.
    pub card_no: Option<String>,
}

impl SyncConfig {
    /// Defaults for the given period; useful for library callers and tests.
    pub fn new(period: TargetPeriod) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            period,
            concurrency: default_concurrency(),
            policy: MergePolicy::default(),
            fetch_timeout: default_fetch_timeout(),
            batch_deadline: None,
            record_empty_fetches: false,
            store_path: PathBuf::from("transactions.json"),
            cards_path: PathBuf::from("cards.json"),
            card_no: None,
        }
    }

    /// Build a config from the process environment.
    ///
    /// `TARGET_MONTH` / `TARGET_YEAR` default to the current local month.
    /// Recognized variables: `EPOS_BASE_URL`, `CONCURRENCY`, `MERGE_POLICY`
    /// (`replace` | `append`), `FETCH_TIMEOUT_SECS`, `BATCH_DEADLINE_SECS`,
    /// `RECORD_EMPTY_FETCHES`, `STORE_FILE`, `CARDS_FILE`, `CARDNO`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let now = chrono::Local::now();
        let month = env_parse("TARGET_MONTH")?.unwrap_or_else(|| now.month());
        let year = env_parse("TARGET_YEAR")?.unwrap_or_else(|| now.year());
        let period = TargetPeriod::new(month, year).ok_or(ConfigError::Invalid {
            name: "TARGET_MONTH",
            value: month.to_string(),
        })?;

        let mut config = Self::new(period);

        if let Ok(url) = std::env::var("EPOS_BASE_URL") {
            config.base_url = url;
        }
        if let Some(width) = env_parse::<usize>("CONCURRENCY")? {
            config.concurrency = width.max(1);
        }
        if let Some(policy) = env_parse("MERGE_POLICY")? {
            config.policy = policy;
        }
        if let Some(secs) = env_parse::<u64>("FETCH_TIMEOUT_SECS")? {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("BATCH_DEADLINE_SECS")? {
            config.batch_deadline = Some(Duration::from_secs(secs));
        }
        if let Some(flag) = env_flag("RECORD_EMPTY_FETCHES")? {
            config.record_empty_fetches = flag;
        }
        if let Ok(path) = std::env::var("STORE_FILE") {
            config.store_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("CARDS_FILE") {
            config.cards_path = PathBuf::from(path);
        }
        if let Ok(card) = std::env::var("CARDNO") {
            if !card.trim().is_empty() {
                config.card_no = Some(card.trim().to_string());
            }
        }

        Ok(config)
    }
}

/// Parse an optional environment variable, failing loudly on malformed input.
fn env_parse<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(ConfigError::Invalid { name, value: raw }),
        },
        Err(_) => Ok(None),
    }
}

fn env_flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" | "" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let period = TargetPeriod::new(9, 2025).unwrap();
        let config = SyncConfig::new(period);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.policy, MergePolicy::SnapshotReplace);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(!config.record_empty_fetches);
        assert!(config.card_no.is_none());
    }
}
