//! Types for iTunes API responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Payloads
// ============================================================================

/// Raw body of an iTunes Search API response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPayload(pub Value);

impl SearchPayload {
    /// The flat `results` list, if the body has one.
    pub fn results(&self) -> Option<&[Value]> {
        self.0.get("results")?.as_array().map(Vec::as_slice)
    }
}

/// Raw body of an iTunes RSS (top podcasts) response.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPayload(pub Value);

impl FeedPayload {
    /// The nested `feed.entry` list, if the body has one.
    pub fn entries(&self) -> Option<&[Value]> {
        self.0.pointer("/feed/entry")?.as_array().map(Vec::as_slice)
    }
}

// ============================================================================
// Search API item
// ============================================================================

/// One item of the Search API `results` list.
///
/// Every field is optional; the API omits whatever a collection lacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItunesSearchResult {
    pub wrapper_type: Option<String>,
    pub kind: Option<String>,
    pub artist_id: Option<i64>,
    pub collection_id: Option<i64>,
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
    pub release_date: Option<String>,
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
