//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without reaching
//! the real iTunes API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use podscout_core::{
    testing::MockContentProvider, Config, ContentProvider, DatabaseConfig, PodcastCatalog,
    ServerConfig, SqliteCatalog,
};

/// Re-export fixtures for test convenience
pub use podscout_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// By default the router talks to a `MockContentProvider` and a SQLite
/// catalog in a temporary directory.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.provider.set_search_payload(fixtures::search_payload(&[(1, "A")])).await;
///
///     let response = fixture.get("/search?term=a").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock provider - configure search and feed payloads
    pub provider: Arc<MockContentProvider>,
    /// Catalog the router writes to
    pub catalog: Arc<dyn PodcastCatalog>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Clone, Default)]
pub struct TestConfig {
    /// Provider used by the router instead of the mock
    pub provider: Option<Arc<dyn ContentProvider>>,
    /// Catalog used instead of SQLite
    pub catalog: Option<Arc<dyn PodcastCatalog>>,
}

impl TestConfig {
    pub fn with_provider(provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            provider: Some(provider),
            catalog: None,
        }
    }

    pub fn with_catalog(catalog: Arc<dyn PodcastCatalog>) -> Self {
        Self {
            provider: None,
            catalog: Some(catalog),
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let provider = Arc::new(MockContentProvider::new());
        let router_provider = test_config
            .provider
            .unwrap_or_else(|| Arc::clone(&provider) as Arc<dyn ContentProvider>);

        let catalog: Arc<dyn PodcastCatalog> = match test_config.catalog {
            Some(catalog) => catalog,
            None => Arc::new(
                SqliteCatalog::new(&db_path, config.database.busy_timeout())
                    .expect("Failed to create catalog"),
            ),
        };

        let state = Arc::new(podscout_server::state::AppState::new(
            config,
            router_provider,
            Arc::clone(&catalog),
        ));
        let router = podscout_server::api::create_router(state);

        Self {
            router,
            provider,
            catalog,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let (status, bytes) = self.send("GET", path).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let (status, body_bytes) = self.send(method, path).await;

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    async fn send(&self, method: &str, path: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
