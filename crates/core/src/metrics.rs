//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Content provider calls (iTunes search and top podcasts feed)
//! - Item mapping failures
//! - Catalog upserts

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Content Provider Metrics
// =============================================================================

/// Provider request duration.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podscout_provider_request_duration_seconds",
            "Duration of content provider calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

/// Provider requests total.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podscout_provider_requests_total",
            "Total content provider requests",
        ),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Ingestion Metrics
// =============================================================================

/// Raw items that could not be mapped and were replaced by a placeholder.
pub static MAPPING_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podscout_mapping_failures_total",
            "Provider items that failed to map to a podcast record",
        ),
        &["shape"], // "search_result", "feed_entry"
    )
    .unwrap()
});

/// Catalog upserts by outcome.
pub static UPSERTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podscout_upserts_total", "Total podcast upserts"),
        &["result"], // "inserted", "updated", "failed", "timeout"
    )
    .unwrap()
});

/// Records stored under a derived key, awaiting review.
pub static DERIVED_IDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podscout_derived_ids_total",
            "Records whose collection id was derived from stable fields",
        ),
        &["shape"],
    )
    .unwrap()
});

/// Podcasts currently in the catalog (collected on scrape).
pub static CATALOG_PODCASTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("podscout_catalog_podcasts", "Podcasts stored in the catalog").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(MAPPING_FAILURES.clone()),
        Box::new(UPSERTS_TOTAL.clone()),
        Box::new(DERIVED_IDS_TOTAL.clone()),
        Box::new(CATALOG_PODCASTS.clone()),
    ]
}
