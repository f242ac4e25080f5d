// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::AppState;
use crate::service::HealthStatus;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type HealthResponse = HealthStatus;

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.service.health())
}

/// GET /version
pub async fn version_handler() -> Json<serde_json::Value> {
    Json(crate::version::get_version_info())
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.service.metrics().export(),
    )
}

/// Counts every routed request by matched path and response status
pub async fn track_requests(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let route = matched
        .as_ref()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    state
        .service
        .metrics()
        .record_request(&route, response.status().as_u16());
    response
}
