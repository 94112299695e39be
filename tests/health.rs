//! Health endpoints through the production router and middleware.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::DateTime;
use deployease::{middleware::MiddlewareConfig, server::build_app};
use tower::ServiceExt;

mod common;

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let (state, _) = common::test_state();
    let app = build_app(state, MiddlewareConfig::default());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, common::body_json(response).await)
}

#[tokio::test]
async fn test_health_reports_version() {
    for uri in ["/health", "/health/"] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0.0");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
    }
}

#[tokio::test]
async fn test_ready() {
    let (status, body) = get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (state, _) = common::test_state();
    let app = build_app(state, MiddlewareConfig::default());
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
