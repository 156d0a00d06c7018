//! Translation of provider items into canonical podcast records.
//!
//! The `try_*` functions report why an item could not be mapped. The plain
//! variants never fail: they log, count the failure and return
//! [`Podcast::placeholder`], which callers filter out before persisting.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{CollectionId, Podcast, DERIVED_ID_PREFIX, PLACEHOLDER_ARTWORK};
use crate::metrics::{DERIVED_IDS_TOTAL, MAPPING_FAILURES};
use crate::provider::ItunesSearchResult;

/// Hex characters of the SHA-256 digest kept in a derived id.
const DERIVED_ID_HEX_LEN: usize = 16;

const UNKNOWN_NAME: &str = "Unknown Podcast";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_GENRE: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available";

/// Errors that stop a single item from being mapped.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("malformed item: {0}")]
    Malformed(String),
}

/// Which provider shape an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    SearchResult,
    FeedEntry,
}

impl ItemShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemShape::SearchResult => "search_result",
            ItemShape::FeedEntry => "feed_entry",
        }
    }
}

/// Deterministic collection id for an item the provider did not identify.
///
/// The same name, artist and feed URL always produce the same id, so
/// re-ingesting the item updates the record instead of duplicating it.
pub fn derive_collection_id(name: &str, artist: &str, feed_url: &str) -> CollectionId {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(artist.as_bytes());
    hasher.update(b"|");
    hasher.update(feed_url.as_bytes());
    let digest = hasher.finalize();

    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    CollectionId::Text(format!(
        "{}{}",
        DERIVED_ID_PREFIX,
        &hex[..DERIVED_ID_HEX_LEN]
    ))
}

/// Map a Search API item, falling back to the placeholder.
pub fn from_search_result(item: &Value) -> Podcast {
    try_from_search_result(item).unwrap_or_else(|e| recover(ItemShape::SearchResult, e))
}

/// Map an RSS feed entry, falling back to the placeholder.
pub fn from_feed_entry(entry: &Value) -> Podcast {
    try_from_feed_entry(entry).unwrap_or_else(|e| recover(ItemShape::FeedEntry, e))
}

fn recover(shape: ItemShape, err: MappingError) -> Podcast {
    warn!("Failed to map {}: {}", shape.as_str(), err);
    MAPPING_FAILURES.with_label_values(&[shape.as_str()]).inc();
    Podcast::placeholder()
}

/// Map a Search API item. Fields carry over one to one.
pub fn try_from_search_result(item: &Value) -> Result<Podcast, MappingError> {
    if !item.is_object() {
        return Err(MappingError::NotAnObject);
    }
    let raw: ItunesSearchResult = serde_json::from_value(item.clone())
        .map_err(|e| MappingError::Malformed(e.to_string()))?;

    let collection_id = match raw.collection_id {
        Some(id) => CollectionId::Numeric(id),
        None => {
            let id = derive_collection_id(
                raw.collection_name.as_deref().unwrap_or_default(),
                raw.artist_name.as_deref().unwrap_or_default(),
                raw.feed_url.as_deref().unwrap_or_default(),
            );
            debug!("Search result without collectionId, derived {}", id);
            DERIVED_IDS_TOTAL
                .with_label_values(&[ItemShape::SearchResult.as_str()])
                .inc();
            id
        }
    };

    let description = raw
        .description
        .filter(|d| !d.trim().is_empty())
        .or_else(|| raw.collection_name.clone());
    let release_date = raw.release_date.as_deref().and_then(parse_date);

    Ok(Podcast {
        collection_id,
        wrapper_type: raw.wrapper_type,
        kind: raw.kind,
        artist_id: raw.artist_id,
        track_id: raw.track_id,
        artist_name: raw.artist_name,
        collection_name: raw.collection_name,
        track_name: raw.track_name,
        collection_censored_name: raw.collection_censored_name,
        track_censored_name: raw.track_censored_name,
        description,
        artist_view_url: raw.artist_view_url,
        collection_view_url: raw.collection_view_url,
        feed_url: raw.feed_url,
        track_view_url: raw.track_view_url,
        artwork_url30: raw.artwork_url30,
        artwork_url60: raw.artwork_url60,
        artwork_url100: raw.artwork_url100,
        artwork_url600: raw.artwork_url600,
        collection_price: raw.collection_price,
        track_price: raw.track_price,
        collection_hd_price: raw.collection_hd_price,
        release_date,
        collection_explicitness: raw.collection_explicitness,
        track_explicitness: raw.track_explicitness,
        track_count: raw.track_count,
        track_time_millis: raw.track_time_millis,
        country: raw.country,
        currency: raw.currency,
        primary_genre_name: raw.primary_genre_name,
        content_advisory_rating: raw.content_advisory_rating,
        genre_ids: raw.genre_ids,
        genres: raw.genres,
    })
}

/// Map an entry of the top podcasts RSS feed.
///
/// Labels live under `label` keys and the id under
/// `id.attributes["im:id"]`. Missing fields take fixed defaults.
pub fn try_from_feed_entry(entry: &Value) -> Result<Podcast, MappingError> {
    if !entry.is_object() {
        return Err(MappingError::NotAnObject);
    }

    let name = label(entry, "/im:name/label").unwrap_or(UNKNOWN_NAME);
    let artist = label(entry, "/im:artist/label").unwrap_or(UNKNOWN_ARTIST);
    let artwork = label(entry, "/im:image/2/label").unwrap_or(PLACEHOLDER_ARTWORK);
    let feed_url = label(entry, "/link/1/attributes/href").unwrap_or_default();
    let genre_id = label(entry, "/category/attributes/im:id");
    let genre_term = label(entry, "/category/attributes/term").unwrap_or(UNKNOWN_GENRE);
    let genre_label = label(entry, "/category/attributes/label").unwrap_or(UNKNOWN_GENRE);
    let description = label(entry, "/summary/label")
        .or_else(|| label(entry, "/im:name/label"))
        .unwrap_or(NO_DESCRIPTION);
    let release_date = label(entry, "/im:releaseDate/label")
        .and_then(parse_date)
        .unwrap_or_else(Utc::now);

    let collection_id = match entry.pointer("/id/attributes/im:id") {
        Some(Value::String(s)) if !s.trim().is_empty() => CollectionId::from_key(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) => CollectionId::Numeric(id),
            None => return Err(MappingError::Malformed(format!("id {} is not an integer", n))),
        },
        None | Some(Value::Null) | Some(Value::String(_)) => {
            let id = derive_collection_id(name, artist, feed_url);
            debug!("Feed entry '{}' has no id, derived {}", name, id);
            DERIVED_IDS_TOTAL
                .with_label_values(&[ItemShape::FeedEntry.as_str()])
                .inc();
            id
        }
        Some(other) => {
            return Err(MappingError::Malformed(format!(
                "unexpected id attribute {}",
                other
            )))
        }
    };

    Ok(Podcast {
        artist_name: Some(artist.to_string()),
        collection_name: Some(name.to_string()),
        description: Some(description.to_string()),
        artist_view_url: label(entry, "/im:artist/attributes/href").map(str::to_string),
        collection_view_url: label(entry, "/id/label").map(str::to_string),
        feed_url: Some(feed_url.to_string()),
        artwork_url100: Some(artwork.to_string()),
        release_date: Some(release_date),
        primary_genre_name: Some(genre_label.to_string()),
        genre_ids: genre_id.map(|id| vec![id.to_string()]).unwrap_or_default(),
        genres: vec![genre_term.to_string()],
        ..Podcast::new(collection_id)
    })
}

/// Non-empty string at a JSON pointer.
fn label<'a>(entry: &'a Value, pointer: &str) -> Option<&'a str> {
    entry
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
