//! Remote event store client
//!
//! The remote document store is an external collaborator; this module pins
//! down its interface boundary. The orchestrator can issue two query shapes
//! against the events collection: date-ordered (preferred) and unordered
//! (fallback when the ordered query is unsupported, with the sort applied in
//! memory by the caller).

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::data::EventRecord;

/// Errors that can occur when querying the remote event store
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse the store response
    #[error("Failed to parse store response: {0}")]
    ParseError(String),

    /// The store (or one of its query shapes) is unavailable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the remote events collection
///
/// Abstracted as a trait so the feed orchestrator can be driven against
/// alternative backends and test stubs. Both methods return the full
/// collection; each document maps 1:1 to an [`EventRecord`].
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetches all event documents ordered by date ascending
    ///
    /// May fail where the unordered query would succeed (e.g., a missing
    /// index on the date field); callers fall back to
    /// [`fetch_unordered`](EventStore::fetch_unordered) and sort in memory.
    async fn fetch_ordered(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Fetches all event documents with no ordering guarantee
    async fn fetch_unordered(&self) -> Result<Vec<EventRecord>, StoreError>;
}

/// Event store client backed by a JSON collection endpoint
#[derive(Debug, Clone)]
pub struct HttpEventStore {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL of the events collection
    base_url: String,
}

impl HttpEventStore {
    /// Creates a new client for the events collection at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Creates a new client with a custom HTTP client
    #[allow(dead_code)]
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            http_client: client,
            base_url: base_url.into(),
        }
    }

    /// URL for the date-ordered query shape
    fn ordered_url(&self) -> String {
        format!("{}?order_by=date", self.base_url)
    }

    /// Fetches and parses the collection at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<EventRecord>, StoreError> {
        let response = self.http_client.get(url).send().await?;
        let text = response.text().await?;
        parse_records(&text)
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn fetch_ordered(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.fetch(&self.ordered_url()).await
    }

    async fn fetch_unordered(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.fetch(&self.base_url).await
    }
}

/// Parses a store response body into event records
fn parse_records(body: &str) -> Result<Vec<EventRecord>, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::ParseError(e.to_string()))
}
