//! Health Check API Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "alive");
}

/// Readiness reports the store check
#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/ready").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "healthy");
}

/// Metrics are exposed in the Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;
    app.server.get("/health").await;

    let response = app.server.get("/metrics").await;

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("poetry_server_http_requests_total"));
}
