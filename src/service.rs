// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding service: the inference and health methods over the resident model
//!
//! HTTP handlers and the keep-warm task both go through [`EmbeddingService`];
//! it owns the only reference to the model that request paths use.

use crate::embeddings::errors::Result;
use crate::embeddings::{l2_normalize, EmbeddingError, EmbeddingModel};
use crate::monitoring::ServiceMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Text used for the one-time warmup inference
const WARMUP_TEXT: &str = "warmup";

/// Result of one `embed` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingBatch {
    /// One vector per input, in input order
    pub embeddings: Vec<Vec<f32>>,
    pub dims: usize,
    pub count: usize,
    pub model: String,
    /// Encode wall-clock time, rounded to two decimals
    pub latency_ms: f64,
}

/// Liveness report of the resident model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model: String,
    /// Name of the device the model runs on
    pub gpu: String,
    pub dims: usize,
}

#[derive(Clone)]
pub struct EmbeddingService {
    model: Arc<dyn EmbeddingModel>,
    metrics: ServiceMetrics,
}

impl std::fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("model", &self.model.model_name())
            .field("dims", &self.model.dimension())
            .finish_non_exhaustive()
    }
}

impl EmbeddingService {
    pub fn new(model: Arc<dyn EmbeddingModel>, metrics: ServiceMetrics) -> Self {
        Self { model, metrics }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Encodes `texts`, optionally scaling every vector to unit L2 norm.
    ///
    /// Runs on the blocking pool. Input validation (non-empty, batch limit) is
    /// the caller's job.
    pub async fn embed(&self, texts: Vec<String>, normalize: bool) -> Result<EmbeddingBatch> {
        let count = texts.len();
        let dims = self.model.dimension();
        let model = self.model.clone();

        let start = Instant::now();
        let embeddings = tokio::task::spawn_blocking(move || {
            let mut embeddings = model.embed_batch(&texts)?;
            if normalize {
                embeddings.iter_mut().for_each(|v| l2_normalize(v));
            }
            Ok::<_, EmbeddingError>(embeddings)
        })
        .await
        .map_err(|e| EmbeddingError::TaskFailed(e.to_string()))??;
        let elapsed = start.elapsed();

        if embeddings.len() != count {
            return Err(EmbeddingError::CountMismatch {
                expected: count,
                actual: embeddings.len(),
            });
        }
        if let Some((index, emb)) = embeddings.iter().enumerate().find(|(_, e)| e.len() != dims) {
            return Err(EmbeddingError::DimensionMismatch {
                index,
                expected: dims,
                actual: emb.len(),
            });
        }

        self.metrics.record_inference(count, elapsed.as_secs_f64());
        let latency_ms = round_ms(elapsed.as_secs_f64() * 1000.0);
        debug!("Embedded {} texts in {} ms", count, latency_ms);

        Ok(EmbeddingBatch {
            embeddings,
            dims,
            count,
            model: self.model.model_name().to_string(),
            latency_ms,
        })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            model: self.model.model_name().to_string(),
            gpu: self.model.device().name.clone(),
            dims: self.model.dimension(),
        }
    }

    /// Runs the one-time warmup inference so the first request pays no
    /// initialization cost.
    pub async fn warmup(&self) -> Result<()> {
        let batch = self.embed(vec![WARMUP_TEXT.to_string()], true).await?;
        info!(
            "🔥 Model {} loaded and ready on {} (warmup {} ms)",
            batch.model,
            self.model.device(),
            batch.latency_ms
        );
        Ok(())
    }
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
