//! Discovery service - search and trending ingestion.
//!
//! Each call fetches one provider response, maps every item, drops the
//! placeholders and synchronizes the rest into the catalog.

mod types;

pub use types::*;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::podcast::{mapping, Podcast};
use crate::provider::ContentProvider;
use crate::sync::PodcastSynchronizer;

/// Orchestrates provider, mapping and synchronizer.
#[derive(Clone)]
pub struct DiscoveryService {
    provider: Arc<dyn ContentProvider>,
    synchronizer: PodcastSynchronizer,
}

impl DiscoveryService {
    pub fn new(provider: Arc<dyn ContentProvider>, synchronizer: PodcastSynchronizer) -> Self {
        Self {
            provider,
            synchronizer,
        }
    }

    /// Search the provider and store every result.
    ///
    /// A blank term is rejected without calling the provider.
    pub async fn search(&self, term: &str) -> Result<IngestReport, DiscoveryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(DiscoveryError::Validation(
                "Search term is required and cannot be empty".to_string(),
            ));
        }

        let payload = self.provider.search(term).await?;
        let items = payload.results().ok_or_else(|| DiscoveryError::NoResults {
            term: term.to_string(),
        })?;

        debug!(term = %term, items = items.len(), "Search returned");
        let report = self.ingest(items, mapping::from_search_result).await?;
        info!(
            term = %term,
            stored = report.podcasts.len(),
            errors = report.errors(),
            "Search ingested"
        );
        Ok(report)
    }

    /// Fetch the trending feed and store every entry.
    pub async fn trending(&self) -> Result<IngestReport, DiscoveryError> {
        let payload = self.provider.trending().await?;
        let entries = payload.entries().ok_or(DiscoveryError::InvalidFeed)?;

        debug!(entries = entries.len(), "Trending feed returned");
        let report = self.ingest(entries, mapping::from_feed_entry).await?;
        info!(
            stored = report.podcasts.len(),
            errors = report.errors(),
            "Trending ingested"
        );
        Ok(report)
    }

    async fn ingest(
        &self,
        items: &[Value],
        map: fn(&Value) -> Podcast,
    ) -> Result<IngestReport, DiscoveryError> {
        let (podcasts, placeholders): (Vec<Podcast>, Vec<Podcast>) =
            items.iter().map(map).partition(|p| !p.is_placeholder());

        let outcome = self.synchronizer.synchronize(podcasts).await;
        if outcome.all_failed() {
            return Err(DiscoveryError::Storage(outcome.failure_summary()));
        }

        Ok(IngestReport {
            mapping_failures: placeholders.len(),
            storage_failures: outcome.failures.len(),
            podcasts: outcome.stored,
        })
    }
}
