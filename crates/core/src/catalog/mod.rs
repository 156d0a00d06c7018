//! Podcast catalog - the persistent store of every podcast seen.
//!
//! Records are keyed by collection id. Writing the same id again overwrites
//! the mapped fields in place; records are never deleted.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use std::time::Instant;

use crate::podcast::{CollectionId, Podcast, StoredPodcast};

/// Trait for podcast catalog storage.
///
/// Implementations are synchronous; async callers run them on the blocking
/// pool.
pub trait PodcastCatalog: Send + Sync {
    /// Insert or overwrite the record for `podcast.collection_id` in one
    /// atomic step.
    ///
    /// `created_at` survives overwrites; `updated_at` is reset on every call.
    fn upsert(&self, podcast: &Podcast) -> Result<UpsertOutcome, CatalogError> {
        self.upsert_until(podcast, None)
    }

    /// Like [`upsert`](Self::upsert), but the write only commits if it can
    /// do so before `deadline`.
    ///
    /// Past the deadline nothing is written and `DeadlineExceeded` is
    /// returned, so an `Ok` always means the record is stored and an error
    /// always means it is not.
    fn upsert_until(
        &self,
        podcast: &Podcast,
        deadline: Option<Instant>,
    ) -> Result<UpsertOutcome, CatalogError>;

    /// Get a podcast by collection id.
    fn get(&self, id: &CollectionId) -> Result<StoredPodcast, CatalogError>;

    /// Weighted text search over name, artist, description and genres.
    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<StoredPodcast>, CatalogError>;

    /// Other podcasts sharing a genre or the primary genre with `id`,
    /// newest first.
    fn find_similar(&self, id: &CollectionId, limit: u32)
        -> Result<Vec<StoredPodcast>, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;
}
