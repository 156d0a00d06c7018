//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full server stack in-process with a mock content
//! provider and a SQLite catalog in a temporary directory.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use podscout_core::{
    testing::MockCatalog, CollectionId, ContentProvider, ItunesClient, ProviderConfig,
    ProviderError,
};

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_root_health() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
    assert_json_path!(response.body, "message", json!("Podcast API is working!"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_returns_stored_records_in_provider_order() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[
            (30, "Gamma"),
            (10, "Alpha"),
            (20, "Beta"),
        ]))
        .await;

    let response = fixture.get("/search?term=daily").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(3));
    assert_json_path!(response.body, "term", json!("daily"));
    assert_json_path!(response.body, "errors", json!(0));

    let ids: Vec<i64> = response.body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["collectionId"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![30, 10, 20]);

    let first = &response.body["results"][0];
    assert_eq!(first["collectionName"], "Gamma");
    assert_eq!(first["needsReview"], false);
    assert!(first["createdAt"].is_string());
    assert!(first["updatedAt"].is_string());

    assert_eq!(fixture.provider.recorded_terms().await, vec!["daily"]);
}

#[tokio::test]
async fn test_search_is_idempotent_per_collection_id() {
    let fixture = TestFixture::new().await;

    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(111, "A")]))
        .await;
    let first = fixture.get("/search?term=a").await;
    assert_status!(first, StatusCode::OK);
    let created_at = first.body["results"][0]["createdAt"].clone();

    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(111, "B")]))
        .await;
    let second = fixture.get("/search?term=b").await;
    assert_status!(second, StatusCode::OK);

    let record = &second.body["results"][0];
    assert_eq!(record["collectionName"], "B");
    assert_eq!(record["createdAt"], created_at);

    let stats = fixture.catalog.stats().unwrap();
    assert_eq!(stats.total_podcasts, 1);

    let stored = fixture.get("/podcasts/111").await;
    assert_status!(stored, StatusCode::OK);
    assert_json_path!(stored.body, "collectionName", json!("B"));
}

#[tokio::test]
async fn test_search_blank_term_rejected_without_provider_call() {
    let fixture = TestFixture::new().await;

    for path in ["/search", "/search?term=", "/search?term=%20%20"] {
        let response = fixture.get(path).await;
        assert_status!(response, StatusCode::BAD_REQUEST);
        assert_json_path!(
            response.body,
            "error",
            json!("Search term is required and cannot be empty")
        );
    }

    assert_eq!(fixture.provider.search_count().await, 0);
    assert_eq!(fixture.catalog.stats().unwrap().total_podcasts, 0);
}

#[tokio::test]
async fn test_search_malformed_query_is_json_400() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/search?term=a&term=b").await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.contains("term"), "error: {}", error);
    assert_eq!(fixture.provider.search_count().await, 0);
}

#[tokio::test]
async fn test_search_without_results_array_is_404() {
    let fixture = TestFixture::new().await;
    fixture.provider.set_search_payload(json!({})).await;

    let response = fixture.get("/search?term=zzz").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(response.body, "error", json!("No podcast results found"));
    assert_json_path!(response.body, "term", json!("zzz"));
    assert_eq!(fixture.catalog.stats().unwrap().total_podcasts, 0);
}

#[tokio::test]
async fn test_search_with_empty_results_is_ok() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/search?term=nothing").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(0));
    assert_json_path!(response.body, "results", json!([]));
}

#[tokio::test]
async fn test_search_isolates_malformed_item() {
    let fixture = TestFixture::new().await;

    let mut results: Vec<_> = (1..=20)
        .map(|id| fixtures::search_result_json(id, &format!("Show {}", id)))
        .collect();
    results[7] = json!("not an object");
    fixture
        .provider
        .set_search_payload(json!({"resultCount": 20, "results": results}))
        .await;

    let response = fixture.get("/search?term=shows").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(19));
    assert_json_path!(response.body, "errors", json!(1));
    assert_eq!(fixture.catalog.stats().unwrap().total_podcasts, 19);
}

#[tokio::test]
async fn test_search_item_without_id_gets_derived_id() {
    let fixture = TestFixture::new().await;

    let mut item = fixtures::search_result_json(1, "Anonymous Show");
    item.as_object_mut().unwrap().remove("collectionId");
    fixture
        .provider
        .set_search_payload(json!({"resultCount": 1, "results": [item]}))
        .await;

    let response = fixture.get("/search?term=anon").await;

    assert_status!(response, StatusCode::OK);
    let record = &response.body["results"][0];
    let id = record["collectionId"].as_str().unwrap();
    assert!(id.starts_with("derived-"));
    assert_eq!(record["needsReview"], true);

    let stored = fixture.get(&format!("/podcasts/{}", id)).await;
    assert_status!(stored, StatusCode::OK);
}

#[tokio::test]
async fn test_search_provider_error_is_502() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_next_error(ProviderError::ApiError {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
        .await;

    let response = fixture.get("/search?term=daily").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_json_path!(
        response.body,
        "error",
        json!("Failed to fetch from iTunes API")
    );
    assert!(response.body["details"]
        .as_str()
        .unwrap()
        .contains("503"));
}

#[tokio::test]
async fn test_search_unreachable_provider_is_502_with_details() {
    // Bind and drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = ItunesClient::new(&ProviderConfig {
        base_url: format!("http://127.0.0.1:{}", port),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap();
    let fixture =
        TestFixture::with_config(TestConfig::with_provider(
            Arc::new(client) as Arc<dyn ContentProvider>
        ))
        .await;

    let response = fixture.get("/search?term=daily").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    let details = response.body["details"].as_str().unwrap();
    assert!(!details.is_empty());
}

#[tokio::test]
async fn test_search_storage_failure_for_every_record_is_500() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.fail_all();
    let fixture = TestFixture::with_config(TestConfig::with_catalog(catalog.clone())).await;
    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(1, "A"), (2, "B")]))
        .await;

    let response = fixture.get("/search?term=x").await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_path!(response.body, "error", json!("Database error"));
    assert!(response.body["details"].is_string());
    assert_eq!(catalog.upsert_count(), 2);
}

#[tokio::test]
async fn test_search_partial_storage_failure_counts_errors() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.fail_for(CollectionId::from(2));
    let fixture = TestFixture::with_config(TestConfig::with_catalog(catalog.clone())).await;
    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(1, "A"), (2, "B"), (3, "C")]))
        .await;

    let response = fixture.get("/search?term=x").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(2));
    assert_json_path!(response.body, "errors", json!(1));
    assert_eq!(catalog.len(), 2);
}

// =============================================================================
// Trending
// =============================================================================

#[tokio::test]
async fn test_trending_stores_feed_entries() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_feed_payload(fixtures::feed_payload(&["1001", "1002"]))
        .await;

    let response = fixture.get("/trending").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(2));
    assert_json_path!(response.body, "errors", json!(0));

    let first = &response.body["results"][0];
    assert_eq!(first["collectionId"], 1001);
    assert_eq!(first["collectionName"], "Show 1001");
    assert_eq!(first["artistName"], "Scicomm Media");
    assert_eq!(first["artworkUrl100"], "https://example.com/170x170bb.png");
    assert_eq!(first["feedUrl"], "https://example.com/feed/1001");
    assert_eq!(first["primaryGenreName"], "Health & Fitness");

    assert_eq!(fixture.provider.trending_count().await, 1);
    assert_eq!(fixture.catalog.stats().unwrap().total_podcasts, 2);
}

#[tokio::test]
async fn test_trending_drops_unmappable_entry() {
    let fixture = TestFixture::new().await;

    let ids: Vec<String> = (1..=20).map(|i| (5000 + i).to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut payload = fixtures::feed_payload(&id_refs);
    payload["feed"]["entry"][3]["id"]["attributes"]["im:id"] = json!({"nested": true});
    fixture.provider.set_feed_payload(payload).await;

    let response = fixture.get("/trending").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(19));
    assert_json_path!(response.body, "errors", json!(1));
    let names: Vec<&str> = response.body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["collectionName"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"Show 5004"));
    assert!(!names.contains(&"Error Processing Podcast"));
}

#[tokio::test]
async fn test_trending_without_entries_is_404() {
    let fixture = TestFixture::new().await;
    fixture.provider.set_feed_payload(json!({"feed": {}})).await;

    let response = fixture.get("/trending").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(response.body, "error", json!("No trending podcasts found"));
    assert_json_path!(
        response.body,
        "details",
        json!("Invalid response format from iTunes API")
    );
}

#[tokio::test]
async fn test_trending_empty_object_is_404_without_writes() {
    let fixture = TestFixture::new().await;
    fixture.provider.set_feed_payload(json!({})).await;

    let response = fixture.get("/trending").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(response.body, "error", json!("No trending podcasts found"));
    assert_eq!(fixture.provider.trending_count().await, 1);
    assert_eq!(fixture.catalog.stats().unwrap().total_podcasts, 0);
}

#[tokio::test]
async fn test_trending_provider_timeout_is_502() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_next_error(ProviderError::Timeout { timeout_secs: 30 })
        .await;

    let response = fixture.get("/trending").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["details"].as_str().unwrap().contains("30s"));
}

// =============================================================================
// Stored podcasts
// =============================================================================

#[tokio::test]
async fn test_get_unknown_podcast_is_404() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/podcasts/424242").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(response.body, "error", json!("Podcast not found"));
}

#[tokio::test]
async fn test_similar_podcasts_share_genres() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(1, "A"), (2, "B"), (3, "C")]))
        .await;
    fixture
        .provider
        .set_feed_payload(fixtures::feed_payload(&["900"]))
        .await;
    assert_status!(fixture.get("/search?term=news").await, StatusCode::OK);
    assert_status!(fixture.get("/trending").await, StatusCode::OK);

    let response = fixture.get("/podcasts/1/similar").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(2));
    let mut ids: Vec<i64> = response.body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["collectionId"].as_i64().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_similar_for_unknown_podcast_is_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/podcasts/5/similar").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trending_episodes_is_empty() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/episodes/trending").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "count", json!(0));
    assert_json_path!(response.body, "results", json!([]));
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_exposes_catalog_and_http_metrics() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_search_payload(fixtures::search_payload(&[(1, "A")]))
        .await;
    assert_status!(fixture.get("/search?term=a").await, StatusCode::OK);

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("podscout_http_requests_total"));
    assert!(body.contains("podscout_catalog_podcasts"));
    assert!(body.contains("podscout_upserts_total"));
    assert!(body.contains("path=\"/search\""));
}
