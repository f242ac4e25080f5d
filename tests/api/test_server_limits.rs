// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! In-flight request limit, request timeout and server shutdown
//!
//! A deliberately slow model holds the single concurrency slot so the other
//! routes can be observed queueing behind it.

use super::common::*;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use memoryrouter_embeddings::{
    api::{create_router, ApiConfig, ApiServer, AppState},
    embeddings::{DeviceInfo, DeviceKind, EmbeddingError, EmbeddingModel},
    monitoring::ServiceMetrics,
    service::EmbeddingService,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Sleeps on the blocking pool before answering
struct SlowModel {
    delay: Duration,
    device: DeviceInfo,
}

impl EmbeddingModel for SlowModel {
    fn model_name(&self) -> &str {
        "slow-model"
    }

    fn dimension(&self) -> usize {
        4
    }

    fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        std::thread::sleep(self.delay);
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
    }
}

fn slow_router(delay: Duration, request_timeout: Duration) -> Router {
    let model = SlowModel {
        delay,
        device: DeviceInfo::new(DeviceKind::Cpu, "CPU (test)"),
    };
    let service = EmbeddingService::new(Arc::new(model), ServiceMetrics::new().unwrap());
    let config = ApiConfig {
        max_concurrent_requests: 1,
        request_timeout,
        ..Default::default()
    };
    create_router(AppState::new(service, config))
}

fn embed_request() -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"texts": ["hold the slot"]}"#))
        .unwrap()
}

#[tokio::test]
async fn test_limit_is_shared_across_routes() {
    let router = slow_router(Duration::from_millis(600), Duration::from_secs(10));

    let started = Instant::now();
    let embed = tokio::spawn(send(router.clone(), embed_request()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    // /health must queue behind the in-flight /embed
    let (status, _) = get(router, "/health").await;
    let waited = started.elapsed();

    assert_eq!(status, StatusCode::OK);
    assert!(
        waited >= Duration::from_millis(500),
        "/health answered after {:?} while /embed held the only slot",
        waited
    );

    let (status, _) = embed.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let router = slow_router(Duration::from_millis(800), Duration::from_millis(200));

    let started = Instant::now();
    let (status, _) = send(router.clone(), embed_request()).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_millis(700));

    // The timed-out request gave its slot back
    let (status, _) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_fast_requests_unaffected_by_limit() {
    let router = slow_router(Duration::from_millis(0), Duration::from_secs(5));

    for _ in 0..3 {
        let (status, _) = send(router.clone(), embed_request()).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_server_serves_until_cancelled() {
    let config = ApiConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        ..Default::default()
    };
    let server = ApiServer::bind(AppState::new(test_service(), config))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let server_task = tokio::spawn(server.run(shutdown.clone()));

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    shutdown.cancel();
    let finished = tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server did not stop after cancellation");
    assert!(finished.unwrap().is_ok());
}
