//! iTunes Search and RSS API client.
//!
//! Both endpoints are public and need no API key:
//! - `{base}/search?media=podcast&term=...` returns `{resultCount, results}`
//! - `{base}/{country}/rss/toppodcasts/limit={n}/json` returns `{feed: {entry}}`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{FeedPayload, SearchPayload};
use super::{ContentProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::metrics::{PROVIDER_REQUESTS, PROVIDER_REQUEST_DURATION};

/// Longest slice of an error body kept in `ApiError` messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// iTunes API client.
pub struct ItunesClient {
    client: Client,
    base_url: String,
    country: String,
    trending_limit: u32,
    timeout_secs: u32,
}

impl ItunesClient {
    /// Create a new iTunes client.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            trending_limit: config.trending_limit,
            timeout_secs: config.timeout_secs,
        })
    }

    /// URL of the search endpoint (without query string).
    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    /// URL of the top podcasts feed.
    pub fn trending_url(&self) -> String {
        format!(
            "{}/{}/rss/toppodcasts/limit={}/json",
            self.base_url, self.country, self.trending_limit
        )
    }

    async fn get_json(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, ProviderError> {
        let start = Instant::now();
        let result = self.send(request).await;

        PROVIDER_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "success" } else { "error" };
        PROVIDER_REQUESTS
            .with_label_values(&[operation, status])
            .inc();

        if let Err(ref e) = result {
            warn!("iTunes {} failed: {}", operation, e);
        }
        result
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ProviderError> {
        let response = request.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        // The search endpoint answers with `text/javascript`, so decode by hand
        let bytes = response.bytes().await.map_err(|e| self.map_error(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn map_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ProviderError::from_reqwest(err)
        }
    }
}

#[async_trait]
impl ContentProvider for ItunesClient {
    async fn search(&self, term: &str) -> Result<SearchPayload, ProviderError> {
        debug!("iTunes search: term='{}'", term);

        let request = self
            .client
            .get(self.search_url())
            .query(&[("media", "podcast"), ("term", term)]);

        self.get_json("search", request).await.map(SearchPayload)
    }

    async fn trending(&self) -> Result<FeedPayload, ProviderError> {
        let url = self.trending_url();
        debug!("iTunes top podcasts: url={}", url);

        let request = self.client.get(url);
        self.get_json("trending", request).await.map(FeedPayload)
    }
}
