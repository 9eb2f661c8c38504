//! HTTP client for the remote user feed.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::ApiError;
use crate::models::{FeedResponse, FeedUser};

/// Base URL of the public user feed.
const FEED_BASE_URL: &str = "https://randomuser.me/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow feed responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A remote source of raw user records.
///
/// `fetch_page` either returns one page of records or fails. There is
/// no retry and no cursor beyond the page number.
#[allow(async_fn_in_trait)]
pub trait UserSource {
    async fn fetch_page(&self, page: usize, results: usize) -> Result<Vec<FeedUser>, ApiError>;
}

/// Feed client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the public feed.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(FEED_BASE_URL)
    }

    /// Create a client against a non-default feed URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn page_url(&self, page: usize, results: usize) -> String {
        format!("{}/?page={}&results={}", self.base_url, page, results)
    }
}

impl UserSource for ApiClient {
    async fn fetch_page(&self, page: usize, results: usize) -> Result<Vec<FeedUser>, ApiError> {
        let url = self.page_url(page, results);
        debug!(%url, "fetching feed page");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let feed: FeedResponse = response.json().await?;
        debug!(count = feed.results.len(), "feed page received");
        Ok(feed.results)
    }
}
