//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversions (by strategy and outcome, duration, rejections)
//! - Placeholder fallbacks (by external failure kind)
//! - External job service stages (create, upload, wait, export, download)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Completed conversions by strategy and outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("filedeck_conversions_total", "Total completed conversions"),
        &["strategy", "outcome"], // outcome: "succeeded", "fallback_applied"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "filedeck_conversion_duration_seconds",
            "Duration of a conversion, including external jobs",
        )
        .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        &["strategy"],
    )
    .unwrap()
});

/// Rejected conversion requests.
pub static CONVERSIONS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "filedeck_conversions_rejected_total",
            "Conversion requests rejected before any work",
        ),
        &["reason"], // "missing_input", "unsupported"
    )
    .unwrap()
});

/// Placeholder fallbacks by the failure that caused them.
pub static FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "filedeck_conversion_fallbacks_total",
            "External conversions replaced by a placeholder document",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// External Job Service Metrics
// =============================================================================

/// Job service stage calls by result.
pub static JOB_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "filedeck_job_service_requests_total",
            "Job service protocol stages by result",
        ),
        &["stage", "result"],
    )
    .unwrap()
});

/// Job service stage duration in seconds.
pub static JOB_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "filedeck_job_service_duration_seconds",
            "Duration of job service protocol stages",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSIONS_REJECTED.clone()),
        Box::new(FALLBACKS_TOTAL.clone()),
        Box::new(JOB_SERVICE_REQUESTS.clone()),
        Box::new(JOB_SERVICE_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        CONVERSIONS_TOTAL
            .with_label_values(&["echo", "succeeded"])
            .inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"filedeck_conversions_total".to_string()));
    }
}
