// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health, /metrics and /version tests

use super::common::*;
use axum::http::StatusCode;
use memoryrouter_embeddings::{
    api::{create_router, ApiConfig, AppState, HealthResponse},
    version,
};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_loaded_model() {
    let (status, bytes) = get(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, TEST_MODEL);
    assert_eq!(health.dims, TEST_DIMS);
    assert!(!health.gpu.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(test_router(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let service = test_service();
    let state = AppState::new(service, ApiConfig::default());

    let (status, _) = post_json(create_router(state.clone()), "/embed", json!({ "texts": ["a", "b"] })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(create_router(state.clone()), "/embed", json!({ "texts": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bytes) = get(create_router(state), "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("embed_requests_total{route=\"/embed\",status=\"200\"} 1"));
    assert!(text.contains("embed_requests_total{route=\"/embed\",status=\"400\"} 1"));
    assert!(text.contains("embed_texts_total 2"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let (status, bytes) = get(test_router(), "/version").await;
    assert_eq!(status, StatusCode::OK);

    let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["version"], version::VERSION_NUMBER);
}
