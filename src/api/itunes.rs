//! iTunes podcast directory client
//!
//! Searches the public iTunes Search API for podcasts and maps each hit to a
//! `SearchResult` whose `href` is the show's feed URL.
//! API docs: https://performance-partners.apple.com/search-api

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::{SearchBackend, SearchError};
use crate::models::SearchResult;

pub const DEFAULT_SEARCH_URL: &str = "https://itunes.apple.com";

/// iTunes Search API client
pub struct ItunesClient {
    base_url: String,
    client: reqwest::Client,
}

impl ItunesClient {
    /// Create a client against the public iTunes endpoint
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_SEARCH_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Search podcasts by term. Blank terms are rejected without a request.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchResult>, SearchError> {
        if term.trim().is_empty() {
            return Err(SearchError::InvalidSearchTerm(term.to_string()));
        }

        let url = format!(
            "{}/search?entity=podcast&term={}",
            self.base_url,
            urlencoding::encode(term)
        );
        tracing::debug!(term, "podcast search");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
                    SearchError::InvalidResponse(format!("JSON parse error: {}", e))
                })?;
                Ok(parsed.into_results())
            }
            status => Err(SearchError::Status(status.as_u16())),
        }
    }
}

impl Default for ItunesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBackend for ItunesClient {
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, SearchError> {
        ItunesClient::search(self, term).await
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResultRaw>,
}

impl SearchResponse {
    fn into_results(self) -> Vec<SearchResult> {
        self.results
            .into_iter()
            .filter_map(|r| r.into_search_result())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultRaw {
    collection_id: Option<u64>,
    artwork_url600: Option<String>,
    artwork_url100: Option<String>,
    collection_name: Option<String>,
    artist_name: Option<String>,
    feed_url: Option<String>,
}

impl SearchResultRaw {
    fn into_search_result(self) -> Option<SearchResult> {
        // Without a feed there is nothing to open
        let Some(href) = self.feed_url.filter(|u| !u.is_empty()) else {
            tracing::debug!(name = ?self.collection_name, "skipping result without feed");
            return None;
        };

        Some(SearchResult {
            id: self.collection_id.unwrap_or(0),
            artwork: self.artwork_url600.or(self.artwork_url100).unwrap_or_default(),
            primary: self.collection_name.unwrap_or_default(),
            secondary: self.artist_name.unwrap_or_default(),
            href,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(feed_url: Option<&str>) -> SearchResultRaw {
        SearchResultRaw {
            collection_id: Some(1),
            artwork_url600: None,
            artwork_url100: Some("http://x/100.jpg".to_string()),
            collection_name: Some("Show".to_string()),
            artist_name: Some("Host".to_string()),
            feed_url: feed_url.map(str::to_string),
        }
    }

    #[test]
    fn test_result_without_feed_is_skipped() {
        assert!(raw(None).into_search_result().is_none());
        assert!(raw(Some("")).into_search_result().is_none());
    }

    #[test]
    fn test_artwork_falls_back_to_small() {
        let result = raw(Some("http://x/rss")).into_search_result().unwrap();
        assert_eq!(result.artwork, "http://x/100.jpg");
        assert_eq!(result.href, "http://x/rss");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"collectionId": 9, "artworkUrl600": "a", "collectionName": "c",
                       "artistName": "n", "feedUrl": "f"}"#;
        let parsed: SearchResultRaw = serde_json::from_str(json).unwrap();
        let result = parsed.into_search_result().unwrap();
        assert_eq!(result.id, 9);
        assert_eq!(result.artwork, "a");
        assert_eq!(result.primary, "c");
        assert_eq!(result.secondary, "n");
    }

    #[tokio::test]
    async fn test_blank_term_rejected_without_request() {
        // Unroutable base: a request would fail with Request, not InvalidSearchTerm
        let client = ItunesClient::with_base_url("http://127.0.0.1:9");
        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidSearchTerm(_)));
    }
}
