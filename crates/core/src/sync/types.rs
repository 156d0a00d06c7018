//! Types for the upsert synchronizer.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::podcast::{CollectionId, StoredPodcast};

/// Why a single record could not be stored.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Upsert did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Upsert task failed: {0}")]
    TaskFailed(String),
}

/// A record that failed to store.
#[derive(Debug)]
pub struct SyncFailure {
    pub collection_id: CollectionId,
    pub error: SyncError,
}

/// Result of synchronizing a batch.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Stored records, in input order.
    pub stored: Vec<StoredPodcast>,
    /// Records that could not be stored, in input order.
    pub failures: Vec<SyncFailure>,
}

impl SyncOutcome {
    /// Nothing stored and at least one failure.
    pub fn all_failed(&self) -> bool {
        self.stored.is_empty() && !self.failures.is_empty()
    }

    /// Failure messages joined for error responses.
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.collection_id, f.error))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
