//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the provider and catalog
//! traits, allowing end-to-end tests without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use podscout_core::testing::{fixtures, MockCatalog, MockContentProvider};
//!
//! let provider = MockContentProvider::new();
//! let catalog = MockCatalog::new();
//!
//! // Configure mock responses
//! provider.set_feed_payload(fixtures::feed_payload(&["1", "2"])).await;
//! catalog.fail_for(CollectionId::Numeric(2));
//!
//! // Use in AppState...
//! ```

mod mock_catalog;
mod mock_content_provider;

pub use mock_catalog::MockCatalog;
pub use mock_content_provider::{MockContentProvider, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::DateTime;
    use serde_json::{json, Value};

    use crate::podcast::Podcast;

    /// Fixed release date (2024-05-01T09:00:00Z).
    const RELEASE_TIMESTAMP: i64 = 1_714_554_000;

    /// A canonical podcast with reasonable defaults.
    pub fn podcast(id: i64, name: &str) -> Podcast {
        Podcast {
            wrapper_type: Some("track".to_string()),
            kind: Some("podcast".to_string()),
            artist_name: Some("Fixture Artist".to_string()),
            collection_name: Some(name.to_string()),
            description: Some(format!("All about {}", name)),
            feed_url: Some(format!("https://example.com/feed/{}", id)),
            artwork_url100: Some(format!("https://example.com/{}/100x100bb.jpg", id)),
            release_date: DateTime::from_timestamp(RELEASE_TIMESTAMP, 0),
            primary_genre_name: Some("Podcasts".to_string()),
            genre_ids: vec!["26".to_string()],
            genres: vec!["Podcasts".to_string()],
            ..Podcast::new(id)
        }
    }

    /// One item of a Search API response.
    pub fn search_result_json(collection_id: i64, name: &str) -> Value {
        json!({
            "wrapperType": "track",
            "kind": "podcast",
            "artistId": 121664449,
            "collectionId": collection_id,
            "trackId": collection_id,
            "artistName": "The New York Times",
            "collectionName": name,
            "trackName": name,
            "collectionCensoredName": name,
            "trackCensoredName": name,
            "collectionViewUrl": format!("https://podcasts.apple.com/us/podcast/id{}", collection_id),
            "feedUrl": format!("https://example.com/feed/{}", collection_id),
            "artworkUrl30": "https://example.com/30x30bb.jpg",
            "artworkUrl60": "https://example.com/60x60bb.jpg",
            "artworkUrl100": "https://example.com/100x100bb.jpg",
            "artworkUrl600": "https://example.com/600x600bb.jpg",
            "collectionPrice": 0.0,
            "trackPrice": 0.0,
            "collectionHdPrice": 0,
            "releaseDate": "2024-05-01T09:00:00Z",
            "collectionExplicitness": "notExplicit",
            "trackExplicitness": "cleaned",
            "trackCount": 2350,
            "country": "USA",
            "currency": "USD",
            "primaryGenreName": "News",
            "contentAdvisoryRating": "Clean",
            "genreIds": ["1489", "26"],
            "genres": ["News", "Podcasts"]
        })
    }

    /// A Search API response body.
    pub fn search_payload(items: &[(i64, &str)]) -> Value {
        let results: Vec<Value> = items
            .iter()
            .map(|(id, name)| search_result_json(*id, name))
            .collect();
        json!({"resultCount": results.len(), "results": results})
    }

    /// One entry of the top podcasts RSS feed.
    pub fn feed_entry_json(id: &str, name: &str) -> Value {
        json!({
            "im:name": {"label": name},
            "im:image": [
                {"label": "https://example.com/55x55bb.png", "attributes": {"height": "55"}},
                {"label": "https://example.com/60x60bb.png", "attributes": {"height": "60"}},
                {"label": "https://example.com/170x170bb.png", "attributes": {"height": "170"}}
            ],
            "summary": {"label": "Science and health"},
            "im:price": {"label": "Get", "attributes": {"amount": "0", "currency": "USD"}},
            "im:contentType": {"attributes": {"term": "Podcast", "label": "Podcast"}},
            "rights": {"label": "© Scicomm Media"},
            "title": {"label": format!("{} - Scicomm Media", name)},
            "link": [
                {"attributes": {"rel": "alternate", "type": "text/html",
                    "href": format!("https://podcasts.apple.com/us/podcast/id{}", id)}},
                {"attributes": {"rel": "enclosure", "href": format!("https://example.com/feed/{}", id)}}
            ],
            "id": {
                "label": format!("https://podcasts.apple.com/us/podcast/id{}", id),
                "attributes": {"im:id": id}
            },
            "im:artist": {
                "label": "Scicomm Media",
                "attributes": {"href": "https://podcasts.apple.com/us/artist/scicomm-media"}
            },
            "category": {"attributes": {
                "im:id": "1512",
                "term": "Health & Fitness",
                "scheme": "https://podcasts.apple.com/us/genre/id1512",
                "label": "Health & Fitness"
            }},
            "im:releaseDate": {"label": "2024-05-01T00:00:00-07:00", "attributes": {"label": "May 1, 2024"}}
        })
    }

    /// A top podcasts RSS response body.
    pub fn feed_payload(ids: &[&str]) -> Value {
        let entries: Vec<Value> = ids
            .iter()
            .map(|id| feed_entry_json(id, &format!("Show {}", id)))
            .collect();
        json!({"feed": {"author": {"name": {"label": "iTunes Store"}}, "entry": entries}})
    }
}
