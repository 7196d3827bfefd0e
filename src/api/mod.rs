//! Remote services consumed by the browser
//!
//! - iTunes: podcast directory search
//! - Feeds: feed fetch and media conversion, direct or through a proxy
//!
//! The coordinator never calls these itself; the session runs them through
//! the `SearchBackend` and `FeedBackend` seams so tests can stand in fakes.

use std::future::Future;

use thiserror::Error;

use crate::feed::{FeedError, FeedParser};
use crate::models::{Feed, SearchResult};

pub mod feeds;
pub mod itunes;

pub use feeds::FeedClient;
pub use itunes::ItunesClient;

/// Podcast search errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// Callers must not search for an empty or whitespace-only term
    #[error("Invalid search term: {0:?}")]
    InvalidSearchTerm(String),

    #[error("Search service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Feed load errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed server returned HTTP {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] FeedError),
}

impl FetchError {
    /// The document arrived but could not be parsed as a feed
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }
}

/// Remote podcast search
pub trait SearchBackend {
    /// Ordered results for `term`; blank terms fail with `InvalidSearchTerm`
    fn search(&self, term: &str) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>>;
}

/// Remote feed fetch and media conversion
pub trait FeedBackend {
    /// Raw feed XML; `Ok(None)` when `url` is empty
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Option<String>, FetchError>>;

    /// URL the player should load for the media at `uri`
    fn playable_url(&self, uri: &str) -> String;
}

/// Fetch and parse a feed. An empty URL loads nothing.
pub async fn load_feed<B: FeedBackend>(
    backend: &B,
    url: &str,
) -> Result<Option<Feed>, FetchError> {
    match backend.fetch(url).await? {
        Some(xml) => Ok(Some(FeedParser::parse(&xml)?)),
        None => Ok(None),
    }
}
