// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings handler (OpenAI-compatible)

use crate::api::errors::OpenAiError;
use crate::api::openai::{OpenAiEmbeddingsRequest, OpenAiEmbeddingsResponse, Usage};
use crate::api::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

/// Drop-in replacement for OpenAI's embeddings endpoint.
///
/// A string `input` is treated as a one-element array. Vectors are always
/// normalized.
///
/// Unlike OpenAI (2048 inputs), at most `api.max_batch_size` inputs are
/// accepted per request: 100 by default, raised with `EMBED_MAX_BATCH_SIZE`.
/// Larger requests get 400 `invalid_request_error`; clients must chunk.
pub async fn openai_embeddings_handler(
    State(state): State<AppState>,
    payload: Result<Json<OpenAiEmbeddingsRequest>, JsonRejection>,
) -> Result<Json<OpenAiEmbeddingsResponse>, OpenAiError> {
    let Json(request) = payload?;
    let texts = request.into_texts(state.config.max_batch_size)?;

    let usage = Usage::from_texts(&texts);
    let batch = state.service.embed(texts, true).await?;

    info!(
        "OpenAI embeddings: {} inputs, {} tokens, {} ms",
        batch.count, usage.total_tokens, batch.latency_ms
    );

    Ok(Json(OpenAiEmbeddingsResponse::from_batch(batch, usage)))
}
