//! Prometheus metrics for the client and its dispatcher.
//!
//! Statics are registered into a caller-provided registry via
//! [`all_metrics`]; the library itself never installs a global registry.

use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
};

// =============================================================================
// Request metrics
// =============================================================================

/// API requests total by operation and outcome.
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("phenoq_requests_total", "Total API requests"),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// API request duration in seconds, by operation.
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "phenoq_request_duration_seconds",
            "Duration of API requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Dispatch metrics
// =============================================================================

/// Tickets currently queued.
pub static DISPATCH_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("phenoq_dispatch_queue_depth", "Tickets currently queued").unwrap()
});

/// Time spent waiting for a dispatch slot.
pub static DISPATCH_WAIT_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "phenoq_dispatch_wait_seconds",
            "Time spent waiting for a dispatch slot",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),
    )
    .unwrap()
});

/// Immediate calls that bypassed the queue.
pub static DISPATCH_BYPASS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "phenoq_dispatch_bypass_total",
        "Immediate calls that bypassed the queue",
    )
    .unwrap()
});

/// Ticket waits that hit the acquire timeout.
pub static DISPATCH_TIMEOUTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "phenoq_dispatch_timeouts_total",
        "Ticket waits that timed out",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Requests
        Box::new(REQUESTS_TOTAL.clone()),
        Box::new(REQUEST_DURATION.clone()),
        // Dispatch
        Box::new(DISPATCH_QUEUE_DEPTH.clone()),
        Box::new(DISPATCH_WAIT_SECONDS.clone()),
        Box::new(DISPATCH_BYPASS_TOTAL.clone()),
        Box::new(DISPATCH_TIMEOUTS_TOTAL.clone()),
    ]
}
