// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

/// POST /embed handler
///
/// Validates the batch (1..=max batch size texts) and forwards it to the
/// resident model.
///
/// # Request Body
/// ```json
/// { "texts": ["text1", "text2"], "normalize": true }
/// ```
///
/// # Errors
/// - 400 when `texts` is empty or exceeds the batch limit
/// - 422 when `texts` is missing or a field has the wrong type
/// - 500 when the model fails
pub async fn embed_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate(state.config.max_batch_size)?;

    let count = request.texts.len();
    let batch = state
        .service
        .embed(request.texts, request.normalize)
        .await?;

    info!(
        "Embedded {} texts ({} dims) in {} ms",
        count, batch.dims, batch.latency_ms
    );

    Ok(Json(batch.into()))
}
