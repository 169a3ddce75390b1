mod client;
mod schema;

use crate::routes::error_chain_fmt;
use async_trait::async_trait;
pub use client::KudaGoClient;
pub use schema::*;

/// Read side of the city events API.
///
/// Every call is a single page request. Implementations do not retry.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn fetch_events(&self) -> Result<Page<Event>, UpstreamError>;

    async fn fetch_place_by_id(&self, place_id: i64) -> Result<Page<Place>, UpstreamError>;

    async fn fetch_collections(&self) -> Result<Page<Collection>, UpstreamError>;

    async fn fetch_movies(&self) -> Result<Page<Movie>, UpstreamError>;

    async fn fetch_news(&self) -> Result<Page<News>, UpstreamError>;

    /// Events without a place resolve to an empty page without touching the network.
    async fn fetch_place(&self, place_id: Option<i64>) -> Result<Page<Place>, UpstreamError> {
        match place_id {
            Some(place_id) => self.fetch_place_by_id(place_id).await,
            None => Ok(Page::empty()),
        }
    }
}

#[derive(thiserror::Error)]
pub enum UpstreamError {
    #[error("Failed to call {endpoint}.")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with status {status}.")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("{endpoint} returned a body that could not be parsed.")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} rejected the call: {description}")]
    Rejected {
        endpoint: String,
        description: String,
    },
}

impl std::fmt::Debug for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
