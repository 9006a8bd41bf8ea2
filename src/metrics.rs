//! Production-grade metrics with Prometheus
//!
//! Exposes key operational metrics for monitoring and alerting:
//! - Request rates and latencies
//! - Upstream database query health
//! - Cache effectiveness
//! - Sanitization pipeline output shape
//!
//! NOTE: We intentionally avoid slugs in metric labels to prevent
//! high-cardinality explosion that can crash Prometheus.

use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "deeper_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Upstream Database Metrics
    // ============================================================================

    /// Upstream queries by table and result
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_db_queries_total", "Total upstream database queries"),
        &["table", "result"]
    ).unwrap();

    /// Upstream query duration
    pub static ref DB_QUERY_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "deeper_db_query_duration_seconds",
            "Upstream database query duration"
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["table"]
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Cache hits by key family
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_cache_hits_total", "Total cache hits"),
        &["family"]
    ).unwrap();

    /// Cache misses by key family
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_cache_misses_total", "Total cache misses"),
        &["family"]
    ).unwrap();

    /// Cache invalidations by tag family
    pub static ref CACHE_INVALIDATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_cache_invalidations_total", "Total cache invalidations"),
        &["family"]
    ).unwrap();

    // ============================================================================
    // Pipeline Metrics
    // ============================================================================

    /// Internal links inserted per sanitized document
    pub static ref PIPELINE_LINKS_INSERTED: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "deeper_pipeline_links_inserted",
            "Internal links inserted per sanitized document"
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 4.0])
    ).unwrap();

    /// Entities recognized per sanitized document
    pub static ref PIPELINE_ENTITIES_FOUND: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "deeper_pipeline_entities_found",
            "Entities recognized per sanitized document"
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0])
    ).unwrap();

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Total errors by code
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("deeper_errors_total", "Total errors by code"),
        &["code"]
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    // Request metrics
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;

    // Upstream database metrics
    METRICS_REGISTRY.register(Box::new(DB_QUERIES_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(DB_QUERY_DURATION.clone()))?;

    // Cache metrics
    METRICS_REGISTRY.register(Box::new(CACHE_HITS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(CACHE_MISSES_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(CACHE_INVALIDATIONS_TOTAL.clone()))?;

    // Pipeline metrics
    METRICS_REGISTRY.register(Box::new(PIPELINE_LINKS_INSERTED.clone()))?;
    METRICS_REGISTRY.register(Box::new(PIPELINE_ENTITIES_FOUND.clone()))?;

    // Error metrics
    METRICS_REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Helper to time operations with histogram (RAII pattern)
/// Usage: let _timer = Timer::new(SOME_HISTOGRAM.clone());
#[allow(unused)] // Public API utility for metrics consumers
pub struct Timer {
    histogram: Histogram,
    start: std::time::Instant,
}

#[allow(unused)] // Public API utility
impl Timer {
    /// Create timer that records duration to histogram on drop
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
