//! Mock content provider for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::provider::{ContentProvider, FeedPayload, ProviderError, SearchPayload};

/// A recorded provider call for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Search { term: String, timestamp: Instant },
    Trending { timestamp: Instant },
}

/// Mock implementation of the ContentProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable raw payloads for search and trending
/// - Track calls for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use podscout_core::testing::{MockContentProvider, fixtures};
///
/// let provider = MockContentProvider::new();
/// provider.set_search_payload(fixtures::search_payload(&[(1, "The Daily")])).await;
///
/// let payload = provider.search("daily").await?;
/// assert_eq!(payload.results().unwrap().len(), 1);
/// assert_eq!(provider.recorded_terms().await, vec!["daily"]);
/// ```
#[derive(Debug)]
pub struct MockContentProvider {
    search_payload: Arc<RwLock<Value>>,
    feed_payload: Arc<RwLock<Value>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<ProviderError>>>,
}

impl Default for MockContentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContentProvider {
    /// Create a mock returning empty result lists.
    pub fn new() -> Self {
        Self {
            search_payload: Arc::new(RwLock::new(json!({"resultCount": 0, "results": []}))),
            feed_payload: Arc::new(RwLock::new(json!({"feed": {"entry": []}}))),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the raw body returned by subsequent searches.
    pub async fn set_search_payload(&self, payload: Value) {
        *self.search_payload.write().await = payload;
    }

    /// Set the raw body returned by subsequent trending calls.
    pub async fn set_feed_payload(&self, payload: Value) {
        *self.feed_payload.write().await = payload;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Terms passed to search, in call order.
    pub async fn recorded_terms(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Search { term, .. } => Some(term.clone()),
                RecordedCall::Trending { .. } => None,
            })
            .collect()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.recorded_terms().await.len()
    }

    /// Get the number of trending fetches performed.
    pub async fn trending_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCall::Trending { .. }))
            .count()
    }

    async fn take_error(&self) -> Option<ProviderError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    async fn search(&self, term: &str) -> Result<SearchPayload, ProviderError> {
        self.calls.write().await.push(RecordedCall::Search {
            term: term.to_string(),
            timestamp: Instant::now(),
        });

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(SearchPayload(self.search_payload.read().await.clone()))
    }

    async fn trending(&self) -> Result<FeedPayload, ProviderError> {
        self.calls.write().await.push(RecordedCall::Trending {
            timestamp: Instant::now(),
        });

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(FeedPayload(self.feed_payload.read().await.clone()))
    }
}
