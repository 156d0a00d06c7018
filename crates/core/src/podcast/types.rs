//! Canonical podcast record shared by both ingestion paths.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of collection ids derived from stable fields instead of
/// being supplied by the provider.
pub const DERIVED_ID_PREFIX: &str = "derived-";

/// Name carried by the placeholder that stands in for an unmappable item.
pub const PLACEHOLDER_NAME: &str = "Error Processing Podcast";

/// Artwork used when the feed entry has none.
pub const PLACEHOLDER_ARTWORK: &str = "/placeholder.svg?height=100&width=100";

/// External identifier of a podcast collection; the dedup key.
///
/// iTunes ids are integers and serialize as JSON numbers. Anything else
/// (including derived ids) is kept verbatim as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionId {
    Numeric(i64),
    Text(String),
}

impl CollectionId {
    /// Whether this id was derived from stable fields rather than supplied.
    pub fn is_derived(&self) -> bool {
        matches!(self, CollectionId::Text(s) if s.starts_with(DERIVED_ID_PREFIX))
    }

    /// Whether this id can act as a storage key.
    pub fn is_empty(&self) -> bool {
        matches!(self, CollectionId::Text(s) if s.trim().is_empty())
    }

    /// Parse a key as written by [`CollectionId::storage_key`].
    pub fn from_key(key: &str) -> Self {
        let trimmed = key.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => CollectionId::Numeric(id),
            Err(_) => CollectionId::Text(trimmed.to_string()),
        }
    }

    /// Key used by the store. Numeric and textual ids never collide because
    /// numeric strings are always parsed into `Numeric`.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionId::Numeric(id) => write!(f, "{}", id),
            CollectionId::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for CollectionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_key(s))
    }
}

impl From<i64> for CollectionId {
    fn from(id: i64) -> Self {
        CollectionId::Numeric(id)
    }
}

/// A podcast in canonical form, produced by mapping a provider item.
///
/// Field names serialize exactly as the iTunes Search API names them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub collection_id: CollectionId,
    pub wrapper_type: Option<String>,
    pub kind: Option<String>,
    pub artist_id: Option<i64>,
    pub track_id: Option<i64>,

    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub track_name: Option<String>,
    pub collection_censored_name: Option<String>,
    pub track_censored_name: Option<String>,
    pub description: Option<String>,

    pub artist_view_url: Option<String>,
    pub collection_view_url: Option<String>,
    pub feed_url: Option<String>,
    pub track_view_url: Option<String>,

    pub artwork_url30: Option<String>,
    pub artwork_url60: Option<String>,
    pub artwork_url100: Option<String>,
    pub artwork_url600: Option<String>,

    pub collection_price: Option<f64>,
    pub track_price: Option<f64>,
    pub collection_hd_price: Option<f64>,

    pub release_date: Option<DateTime<Utc>>,

    pub collection_explicitness: Option<String>,
    pub track_explicitness: Option<String>,

    pub track_count: Option<i64>,
    pub track_time_millis: Option<i64>,

    pub country: Option<String>,
    pub currency: Option<String>,
    pub primary_genre_name: Option<String>,
    pub content_advisory_rating: Option<String>,

    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Podcast {
    /// An otherwise empty record for the given id.
    pub fn new(collection_id: impl Into<CollectionId>) -> Self {
        Self {
            collection_id: collection_id.into(),
            wrapper_type: None,
            kind: None,
            artist_id: None,
            track_id: None,
            artist_name: None,
            collection_name: None,
            track_name: None,
            collection_censored_name: None,
            track_censored_name: None,
            description: None,
            artist_view_url: None,
            collection_view_url: None,
            feed_url: None,
            track_view_url: None,
            artwork_url30: None,
            artwork_url60: None,
            artwork_url100: None,
            artwork_url600: None,
            collection_price: None,
            track_price: None,
            collection_hd_price: None,
            release_date: None,
            collection_explicitness: None,
            track_explicitness: None,
            track_count: None,
            track_time_millis: None,
            country: None,
            currency: None,
            primary_genre_name: None,
            content_advisory_rating: None,
            genre_ids: Vec::new(),
            genres: Vec::new(),
        }
    }

    /// Fully defaulted stand-in for an item that could not be mapped.
    ///
    /// Never persisted; callers drop it before responding.
    pub fn placeholder() -> Self {
        Self {
            artist_name: Some("Unknown".to_string()),
            collection_name: Some(PLACEHOLDER_NAME.to_string()),
            description: Some("Error processing this podcast".to_string()),
            feed_url: Some(String::new()),
            artwork_url100: Some(PLACEHOLDER_ARTWORK.to_string()),
            release_date: Some(Utc::now()),
            primary_genre_name: Some("Unknown".to_string()),
            genres: vec!["Unknown".to_string()],
            ..Self::new(CollectionId::Text(String::new()))
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.collection_name.as_deref() == Some(PLACEHOLDER_NAME)
    }
}

/// A podcast as held by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredPodcast {
    #[serde(flatten)]
    pub podcast: Podcast,
    /// Set when the collection id was derived and may not match the
    /// provider's real id.
    pub needs_review: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
