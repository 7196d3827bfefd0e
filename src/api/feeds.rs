//! Feed fetch and media conversion
//!
//! Feeds and audio are usually reached through a small proxy that exposes
//! `/get?uri=` (raw fetch, sidesteps CORS) and `/convert?uri=` (transcode to
//! something the player understands). Without a proxy the feed is fetched
//! directly and media URLs are played as-is.

use reqwest::StatusCode;
use std::time::Duration;

use super::{FeedBackend, FetchError};

/// Feed client, optionally routed through a `/get` + `/convert` proxy
pub struct FeedClient {
    proxy_url: Option<String>,
    client: reqwest::Client,
}

impl FeedClient {
    /// Fetch feeds directly and play enclosures unmodified
    pub fn direct() -> Self {
        Self::build(None, Duration::from_secs(30))
    }

    /// Route fetches and playback through the proxy at `base_url`
    pub fn via_proxy(base_url: impl Into<String>) -> Self {
        Self::build(Some(base_url.into()), Duration::from_secs(30))
    }

    pub fn with_timeout(proxy_url: Option<String>, timeout: Duration) -> Self {
        Self::build(proxy_url, timeout)
    }

    fn build(proxy_url: Option<String>, timeout: Duration) -> Self {
        Self {
            proxy_url: proxy_url.map(|u| u.trim_end_matches('/').to_string()),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    fn endpoint(&self, path: &str, uri: &str) -> String {
        match &self.proxy_url {
            Some(base) => format!("{}/{}?uri={}", base, path, urlencoding::encode(uri)),
            None => uri.to_string(),
        }
    }

    /// Fetch the raw feed document. An empty URL is a no-op.
    pub async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        if url.is_empty() {
            return Ok(None);
        }

        let target = self.endpoint("get", url);
        tracing::debug!(url, target = %target, "fetching feed");

        let response = self.client.get(&target).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.text().await?)),
            status => Err(FetchError::Status(status.as_u16())),
        }
    }

    /// URL the player should load for `uri`
    pub fn playable_url(&self, uri: &str) -> String {
        self.endpoint("convert", uri)
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::direct()
    }
}

impl FeedBackend for FeedClient {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        FeedClient::fetch(self, url).await
    }

    fn playable_url(&self, uri: &str) -> String {
        FeedClient::playable_url(self, uri)
    }
}
