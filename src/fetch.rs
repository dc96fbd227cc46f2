//! Page fetching.
//!
//! The portal is reachable two ways in practice: a plain HTTP request, or a
//! rendered browser session when the page is fetched through a driver. Both
//! are the same capability to the rest of the pipeline, so the coordinator
//! only ever sees `PageFetcher`. The in-tree strategy is plain HTTP.

use std::time::Duration;

use async_trait::async_trait;

/// Errors from retrieving a portal page. Always scoped to a single card;
/// the batch keeps going.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("portal returned status {status}")]
    BadStatus { status: u16 },
}

/// A strategy for turning a card number into raw page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, card_no: &str) -> Result<String, FetchError>;
}

/// Direct HTTP fetch strategy.
///
/// The client's request timeout bounds every call; a timed-out request
/// surfaces as `FetchError::Http` for that card only. Connections are
/// acquired and released per request by the client pool.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, card_no: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, card_no);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
