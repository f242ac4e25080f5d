// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed

use crate::service::EmbeddingBatch;
use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// # Example
/// ```json
/// {
///   "embeddings": [[0.01, -0.02, ...]],
///   "dims": 1024,
///   "count": 1,
///   "model": "BAAI/bge-large-en-v1.5",
///   "latency_ms": 12.34
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// One vector per input text, in request order
    pub embeddings: Vec<Vec<f32>>,
    pub dims: usize,
    pub count: usize,
    pub model: String,
    pub latency_ms: f64,
}

impl From<EmbeddingBatch> for EmbedResponse {
    fn from(batch: EmbeddingBatch) -> Self {
        Self {
            embeddings: batch.embeddings,
            dims: batch.dims,
            count: batch.count,
            model: batch.model,
            latency_ms: batch.latency_ms,
        }
    }
}
