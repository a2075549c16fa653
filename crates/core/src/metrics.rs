//! Prometheus metrics for the search pipeline.
//!
//! The collectors are process-wide statics. Nothing is exported unless the
//! embedding program registers them with [`register_metrics`].

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;

// =============================================================================
// Sources
// =============================================================================

/// Source requests total by source and result.
pub static SOURCE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("turok_source_requests_total", "Total source search requests"),
        &["source", "result"], // "ok", "network", "http-status", "parse", "timeout"
    )
    .unwrap()
});

/// Source request duration in seconds.
pub static SOURCE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "turok_source_duration_seconds",
            "Duration of a source search, including timeouts",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Searches
// =============================================================================

/// Ranked results per search.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("turok_search_results", "Number of ranked results per search")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Count one finished source request and its duration.
pub fn record_source_outcome(source: &str, result: &str, elapsed: Duration) {
    SOURCE_REQUESTS.with_label_values(&[source, result]).inc();
    SOURCE_DURATION
        .with_label_values(&[source])
        .observe(elapsed.as_secs_f64());
}

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SOURCE_REQUESTS.clone()),
        Box::new(SOURCE_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}

/// Register every metric with `registry`.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    for collector in all_metrics() {
        registry.register(collector)?;
    }
    Ok(())
}
