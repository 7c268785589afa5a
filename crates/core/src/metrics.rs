//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline runs (counts by mode and result, durations)
//! - Gateway calls (counts by endpoint and result, durations)
//! - Remote object teardown (deletions, failures)

use once_cell::sync::Lazy;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline runs total by mode and result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("prospector_runs_total", "Total pipeline runs"),
        &["mode", "result"], // result: "complete", "failed", "cancelled"
    )
    .unwrap()
});

/// Run duration in seconds by mode.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prospector_run_duration_seconds",
            "Duration of pipeline runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Gateway Metrics
// =============================================================================

/// Gateway calls total by endpoint and result.
pub static GATEWAY_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("prospector_gateway_calls_total", "Total gateway calls"),
        &["endpoint", "result"], // result: "ok", "error"
    )
    .unwrap()
});

/// Gateway call duration in seconds by endpoint.
pub static GATEWAY_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prospector_gateway_call_duration_seconds",
            "Duration of gateway calls",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Teardown Metrics
// =============================================================================

/// Remote objects deleted successfully.
pub static OBJECTS_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "prospector_objects_deleted_total",
        "Remote objects deleted during teardown",
    )
    .unwrap()
});

/// Remote object deletions that failed.
pub static OBJECT_DELETE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "prospector_object_delete_failures_total",
        "Remote object deletions that failed",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(RUNS_TOTAL.clone())).unwrap();
    registry.register(Box::new(RUN_DURATION.clone())).unwrap();
    registry.register(Box::new(GATEWAY_CALLS.clone())).unwrap();
    registry
        .register(Box::new(GATEWAY_CALL_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(OBJECTS_DELETED.clone()))
        .unwrap();
    registry
        .register(Box::new(OBJECT_DELETE_FAILURES.clone()))
        .unwrap();
}
