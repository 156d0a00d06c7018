//! Podcast API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use podscout_core::{CatalogError, CollectionId, StoredPodcast};

use super::ApiError;
use crate::state::AppState;

/// Most podcasts returned by the similar endpoint.
const SIMILAR_LIMIT: u32 = 4;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub term: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub term: String,
    pub results: Vec<StoredPodcast>,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
pub struct PodcastListResponse {
    pub count: usize,
    pub results: Vec<StoredPodcast>,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub count: usize,
    pub results: Vec<StoredPodcast>,
}

#[derive(Debug, Serialize)]
pub struct EpisodesResponse {
    pub count: usize,
    pub results: Vec<Value>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /search?term=
///
/// Search iTunes and store every result.
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let term = params.term.unwrap_or_default();
    let report = state.discovery().search(&term).await?;

    Ok(Json(SearchResponse {
        count: report.podcasts.len(),
        term: term.trim().to_string(),
        errors: report.errors(),
        results: report.podcasts,
    }))
}

/// GET /trending
///
/// Fetch the top podcasts feed and store every entry.
pub async fn trending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PodcastListResponse>, ApiError> {
    let report = state.discovery().trending().await?;

    Ok(Json(PodcastListResponse {
        count: report.podcasts.len(),
        errors: report.errors(),
        results: report.podcasts,
    }))
}

/// GET /podcasts/{collection_id}
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
) -> Result<Json<StoredPodcast>, ApiError> {
    let catalog = state.catalog();
    let id = CollectionId::from_key(&collection_id);

    let podcast = run_blocking(move || catalog.get(&id)).await?;
    Ok(Json(podcast))
}

/// GET /podcasts/{collection_id}/similar
///
/// Stored podcasts sharing a genre or the primary genre, newest first.
pub async fn similar_podcasts(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
) -> Result<Json<SimilarResponse>, ApiError> {
    let catalog = state.catalog();
    let id = CollectionId::from_key(&collection_id);

    let results = run_blocking(move || catalog.find_similar(&id, SIMILAR_LIMIT)).await?;
    Ok(Json(SimilarResponse {
        count: results.len(),
        results,
    }))
}

/// GET /episodes/trending
///
/// Episodes are not stored, so this is always empty.
pub async fn trending_episodes() -> Json<EpisodesResponse> {
    Json(EpisodesResponse {
        count: 0,
        results: Vec::new(),
    })
}

/// Run a catalog read on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}
