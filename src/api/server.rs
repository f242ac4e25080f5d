// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::embed::{embed_handler, DEFAULT_MAX_BATCH_SIZE};
use super::handlers::{health_handler, metrics_handler, track_requests, version_handler};
use super::openai::openai_embeddings_handler;
use crate::service::EmbeddingService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: String,
    /// Largest accepted batch on /embed and /v1/embeddings (default 100)
    pub max_batch_size: usize,
    /// In-flight requests per process, across all routes; further requests wait
    pub max_concurrent_requests: usize,
    #[serde(with = "duration_secs", rename = "request_timeout_secs")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_concurrent_requests: 100,
            request_timeout: Duration::from_secs(300),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: EmbeddingService,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(service: EmbeddingService, config: ApiConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let max_concurrent = state.config.max_concurrent_requests.max(1);
    let timeout = state.config.request_timeout;

    Router::new()
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .route("/v1/embeddings", post(openai_embeddings_handler))
        .route("/metrics", get(metrics_handler))
        .route("/version", get(version_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        // One semaphore shared by every route
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP front-end bound to its listen address
pub struct ApiServer {
    listener: TcpListener,
    state: AppState,
}

impl ApiServer {
    pub async fn bind(state: AppState) -> Result<Self> {
        let addr: SocketAddr = state
            .config
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", state.config.listen_addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until `shutdown` is cancelled, then drains in-flight requests
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        let app = create_router(self.state);

        info!("API server listening on {}", addr);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("HTTP server failed")?;

        info!("API server stopped");
        Ok(())
    }
}
