// Prometheus metrics definitions for the fighter trivia backend.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Fight graphs built from the bout history.
    pub static ref GRAPH_BUILDS_TOTAL: IntCounter = IntCounter::new(
        "fighters_graph_builds_total",
        "Fight graphs built from bout history",
    )
    .unwrap();

    /// Shortest path searches, by outcome (found, not_found).
    pub static ref PATH_SEARCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fighters_path_searches_total", "Shortest path searches"),
        &["outcome"],
    )
    .unwrap();

    /// Puzzle pair requests, by outcome (generated, failed).
    pub static ref PUZZLE_PAIRS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fighters_puzzle_pairs_total", "Puzzle pair generation requests"),
        &["outcome"],
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fighters_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    pub static ref GRAPH_BUILD_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fighters_graph_build_duration_seconds",
            "Time to build the fight graph in seconds",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5]),
    )
    .unwrap();

    /// Walk attempts used per puzzle pair request.
    pub static ref PAIR_ATTEMPTS: Histogram = Histogram::with_opts(
        HistogramOpts::new("fighters_pair_attempts", "Walk attempts per puzzle pair request")
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 10.0, 20.0]),
    )
    .unwrap();

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "fighters_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(GRAPH_BUILDS_TOTAL.clone()),
        Box::new(PATH_SEARCHES_TOTAL.clone()),
        Box::new(PUZZLE_PAIRS_TOTAL.clone()),
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(GRAPH_BUILD_DURATION_SECONDS.clone()),
        Box::new(PAIR_ATTEMPTS.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("Metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Normalize a URL path for metric labels. Only known route prefixes are kept
/// verbatim; anything else collapses to `other` to bound label cardinality.
pub fn normalize_path(path: &str) -> String {
    const ROUTES: &[&str] = &[
        "/health",
        "/metrics",
        "/api/fighter",
        "/api/search",
        "/api/random-fighter",
        "/api/daily-fighter",
        "/api/connect/path",
        "/api/connect/pair",
    ];
    let trimmed = path.trim_end_matches('/');
    if ROUTES.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}
