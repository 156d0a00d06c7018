//! Types for the discovery service.

use thiserror::Error;

use crate::podcast::StoredPodcast;
use crate::provider::ProviderError;

/// Outcome of ingesting one provider response.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Stored records, in provider order.
    pub podcasts: Vec<StoredPodcast>,
    /// Items that could not be mapped and were dropped.
    pub mapping_failures: usize,
    /// Mapped records that could not be stored.
    pub storage_failures: usize,
}

impl IngestReport {
    /// Total degraded items, as reported to clients.
    pub fn errors(&self) -> usize {
        self.mapping_failures + self.storage_failures
    }
}

/// Errors for search and trending ingestion.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The request was rejected before calling the provider.
    #[error("{0}")]
    Validation(String),

    /// The search response had no usable `results` list.
    #[error("No podcasts found for term '{term}'")]
    NoResults { term: String },

    /// The feed response had no usable `feed.entry` list.
    #[error("Invalid trending feed format")]
    InvalidFeed,

    #[error(transparent)]
    Upstream(#[from] ProviderError),

    /// Records were produced but none could be stored.
    #[error("Failed to store podcasts: {0}")]
    Storage(String),
}
