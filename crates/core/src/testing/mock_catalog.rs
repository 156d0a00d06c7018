//! Mock podcast catalog for testing.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::catalog::{
    CatalogError, CatalogSearchQuery, CatalogStats, PodcastCatalog, UpsertOutcome,
};
use crate::podcast::{CollectionId, Podcast, StoredPodcast};

#[derive(Debug, Default)]
struct MockState {
    /// Records in insertion order.
    records: Vec<StoredPodcast>,
    failing: HashSet<CollectionId>,
    fail_all: bool,
    upsert_delay: Option<Duration>,
    upsert_calls: usize,
}

/// In-memory implementation of the PodcastCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Fail upserts for chosen collection ids, or for every id
/// - Delay upserts to exercise write deadlines
/// - Count upsert calls
#[derive(Debug, Default)]
pub struct MockCatalog {
    state: Mutex<MockState>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make upserts of `id` fail with a database error.
    pub fn fail_for(&self, id: CollectionId) {
        self.state().failing.insert(id);
    }

    /// Make every upsert fail with a database error.
    pub fn fail_all(&self) {
        self.state().fail_all = true;
    }

    /// Sleep this long inside every upsert.
    pub fn set_upsert_delay(&self, delay: Duration) {
        self.state().upsert_delay = Some(delay);
    }

    /// Number of upsert calls, including failed ones.
    pub fn upsert_count(&self) -> usize {
        self.state().upsert_calls
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PodcastCatalog for MockCatalog {
    fn upsert_until(
        &self,
        podcast: &Podcast,
        deadline: Option<Instant>,
    ) -> Result<UpsertOutcome, CatalogError> {
        let delay = {
            let mut state = self.state();
            state.upsert_calls += 1;
            state.upsert_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CatalogError::DeadlineExceeded);
        }

        let mut state = self.state();
        if state.fail_all || state.failing.contains(&podcast.collection_id) {
            return Err(CatalogError::Database(format!(
                "injected failure for {}",
                podcast.collection_id
            )));
        }
        if podcast.collection_id.is_empty() || podcast.is_placeholder() {
            return Err(CatalogError::InvalidRecord(
                "record cannot be stored".to_string(),
            ));
        }

        let now = Utc::now();
        let needs_review = podcast.collection_id.is_derived();
        if let Some(existing) = state
            .records
            .iter_mut()
            .find(|r| r.podcast.collection_id == podcast.collection_id)
        {
            existing.podcast = podcast.clone();
            existing.needs_review = needs_review;
            existing.updated_at = now;
            return Ok(UpsertOutcome {
                record: existing.clone(),
                inserted: false,
            });
        }

        let record = StoredPodcast {
            podcast: podcast.clone(),
            needs_review,
            created_at: now,
            updated_at: now,
        };
        state.records.push(record.clone());
        Ok(UpsertOutcome {
            record,
            inserted: true,
        })
    }

    fn get(&self, id: &CollectionId) -> Result<StoredPodcast, CatalogError> {
        self.state()
            .records
            .iter()
            .find(|r| &r.podcast.collection_id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<StoredPodcast>, CatalogError> {
        let needle = query.query.to_lowercase();
        Ok(self
            .state()
            .records
            .iter()
            .filter(|r| {
                let p = &r.podcast;
                [&p.collection_name, &p.artist_name, &p.description]
                    .iter()
                    .filter_map(|f| f.as_deref())
                    .chain(p.genres.iter().map(String::as_str))
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    fn find_similar(
        &self,
        id: &CollectionId,
        limit: u32,
    ) -> Result<Vec<StoredPodcast>, CatalogError> {
        let source = self.get(id)?.podcast;
        let state = self.state();

        Ok(state
            .records
            .iter()
            .rev()
            .filter(|r| &r.podcast.collection_id != id)
            .filter(|r| {
                let p = &r.podcast;
                let same_primary = source.primary_genre_name.is_some()
                    && p.primary_genre_name == source.primary_genre_name;
                same_primary || p.genres.iter().any(|g| source.genres.contains(g))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let state = self.state();
        Ok(CatalogStats {
            total_podcasts: state.records.len() as u64,
            needs_review: state.records.iter().filter(|r| r.needs_review).count() as u64,
            oldest_entry: state.records.iter().map(|r| r.created_at).min(),
            newest_entry: state.records.iter().map(|r| r.updated_at).max(),
        })
    }
}
