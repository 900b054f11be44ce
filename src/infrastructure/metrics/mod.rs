//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Poem engagement events (views, likes, comments, saves)
//! - Notifications created, by type

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "poetry_server";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Engagement events on poems
pub static POEM_ENGAGEMENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("poem_engagement_total", "Engagement events recorded on poems")
            .namespace(NAMESPACE),
        &["event"], // "view", "like", "unlike", "comment", "save"
    )
    .expect("Failed to create POEM_ENGAGEMENT_TOTAL metric")
});

/// Notifications created for poem authors
pub static NOTIFICATIONS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notifications_created_total", "Notifications created for poem authors")
            .namespace(NAMESPACE),
        &["type"],
    )
    .expect("Failed to create NOTIFICATIONS_CREATED_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(POEM_ENGAGEMENT_TOTAL.clone()))
        .expect("Failed to register POEM_ENGAGEMENT_TOTAL");
    registry
        .register(Box::new(NOTIFICATIONS_CREATED_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_CREATED_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record an engagement event on a poem
pub fn record_engagement(event: &str) {
    POEM_ENGAGEMENT_TOTAL.with_label_values(&[event]).inc();
}

/// Helper to record a created notification
pub fn record_notification(kind: &str) {
    NOTIFICATIONS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*HTTP_REQUEST_DURATION_SECONDS;
        let _ = &*POEM_ENGAGEMENT_TOTAL;
        let _ = &*NOTIFICATIONS_CREATED_TOTAL;
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("http_requests_total"));
    }

    #[test]
    fn test_record_engagement_and_notification() {
        record_engagement("like");
        record_notification("new_like");
        let metrics = gather_metrics();
        assert!(metrics.contains("poem_engagement_total"));
        assert!(metrics.contains("notifications_created_total"));
    }
}
