//! Upsert synchronizer - reconciles mapped podcasts into the catalog.
//!
//! Every record of a batch is upserted concurrently on the blocking pool.
//! A failing record never aborts the others; its failure is reported next
//! to the stored records. The operation timeout is a commit deadline
//! enforced by the catalog, so a failed write never commits.

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::catalog::{CatalogError, PodcastCatalog};
use crate::metrics::UPSERTS_TOTAL;
use crate::podcast::{Podcast, StoredPodcast};

/// Persists canonical records by collection id.
#[derive(Clone)]
pub struct PodcastSynchronizer {
    catalog: Arc<dyn PodcastCatalog>,
    operation_timeout: Duration,
}

impl PodcastSynchronizer {
    pub fn new(catalog: Arc<dyn PodcastCatalog>, operation_timeout: Duration) -> Self {
        Self {
            catalog,
            operation_timeout,
        }
    }

    /// Upsert every record concurrently and collect the outcome.
    ///
    /// Stored records keep the relative order of `podcasts`.
    pub async fn synchronize(&self, podcasts: Vec<Podcast>) -> SyncOutcome {
        let upserts: Vec<_> = podcasts
            .into_iter()
            .map(|podcast| async move {
                let collection_id = podcast.collection_id.clone();
                (collection_id, self.upsert_one(podcast).await)
            })
            .collect();

        let results = futures::future::join_all(upserts).await;

        let mut outcome = SyncOutcome::default();
        for (collection_id, result) in results {
            match result {
                Ok(stored) => outcome.stored.push(stored),
                Err(error) => {
                    warn!(
                        collection_id = %collection_id,
                        error = %error,
                        "Failed to store podcast"
                    );
                    outcome.failures.push(SyncFailure {
                        collection_id,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Upsert a single record that must commit within the operation timeout.
    ///
    /// The blocking write is awaited to completion, so the result always
    /// matches what the catalog holds.
    pub async fn upsert_one(&self, podcast: Podcast) -> Result<StoredPodcast, SyncError> {
        let catalog = Arc::clone(&self.catalog);
        let deadline = Instant::now() + self.operation_timeout;
        let task =
            tokio::task::spawn_blocking(move || catalog.upsert_until(&podcast, Some(deadline)));

        let result = match task.await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(CatalogError::DeadlineExceeded)) => {
                UPSERTS_TOTAL.with_label_values(&["timeout"]).inc();
                return Err(SyncError::Timeout(self.operation_timeout));
            }
            Ok(Err(e)) => Err(SyncError::from(e)),
            Err(e) => Err(SyncError::TaskFailed(e.to_string())),
        };

        match result {
            Ok(outcome) => {
                let label = if outcome.inserted { "inserted" } else { "updated" };
                UPSERTS_TOTAL.with_label_values(&[label]).inc();
                debug!(
                    collection_id = %outcome.record.podcast.collection_id,
                    result = label,
                    "Upserted podcast"
                );
                Ok(outcome.record)
            }
            Err(e) => {
                UPSERTS_TOTAL.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }
}
