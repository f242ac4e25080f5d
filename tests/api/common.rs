// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers: a router over the deterministic hash model
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use memoryrouter_embeddings::{
    api::{create_router, ApiConfig, AppState},
    embeddings::HashEmbeddingModel,
    monitoring::ServiceMetrics,
    service::EmbeddingService,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

pub const TEST_MODEL: &str = "test-embedder";
pub const TEST_DIMS: usize = 64;

pub fn test_service() -> EmbeddingService {
    let model = HashEmbeddingModel::new(TEST_MODEL, TEST_DIMS).expect("hash model");
    EmbeddingService::new(Arc::new(model), ServiceMetrics::new().expect("metrics"))
}

pub fn test_router() -> Router {
    create_router(AppState::new(test_service(), ApiConfig::default()))
}

pub fn test_router_with(config: ApiConfig) -> Router {
    create_router(AppState::new(test_service(), config))
}

/// Sends one request and returns status plus raw body
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body.to_vec())
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub fn as_vectors(value: &Value) -> Vec<Vec<f32>> {
    serde_json::from_value(value.clone()).expect("array of float arrays")
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
