//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Podscout server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Core ingestion metrics (provider calls, mapping failures, upserts)
//! - Catalog size (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

use podscout_core::metrics::CATALOG_PODCASTS;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podscout_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podscout_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "podscout_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
    ];

    // Core metrics (provider, mapping, catalog)
    for metric in collectors
        .into_iter()
        .chain(podscout_core::metrics::all_metrics())
    {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the catalog at scrape time.
pub async fn collect_dynamic_metrics(state: &AppState) {
    let catalog = state.catalog();
    match tokio::task::spawn_blocking(move || catalog.stats()).await {
        Ok(Ok(stats)) => CATALOG_PODCASTS.set(stats.total_podcasts as i64),
        Ok(Err(e)) => warn!(error = %e, "Failed to read catalog stats"),
        Err(e) => warn!(error = %e, "Catalog stats task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("podscout_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        CATALOG_PODCASTS.set(0);
        podscout_core::metrics::UPSERTS_TOTAL
            .with_label_values(&["inserted"])
            .inc_by(0);
        podscout_core::metrics::MAPPING_FAILURES
            .with_label_values(&["feed_entry"])
            .inc_by(0);

        let output = encode_metrics().unwrap();

        assert!(output.contains("podscout_http_request_duration_seconds"));
        assert!(output.contains("podscout_http_requests_in_flight"));
        assert!(output.contains("podscout_catalog_podcasts"));
        assert!(output.contains("podscout_upserts_total"));
        assert!(output.contains("podscout_mapping_failures_total"));
    }
}
