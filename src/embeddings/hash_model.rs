// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic hash-seeded embedding model
//!
//! Produces stable pseudo-random vectors from a hash of the input text. Used
//! to run the service without model files (`--backend hash`), and by tests and
//! benchmarks.

use super::errors::{EmbeddingError, Result};
use super::{DeviceInfo, EmbeddingModel};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct HashEmbeddingModel {
    model_name: String,
    dimension: usize,
    device: DeviceInfo,
}

impl HashEmbeddingModel {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            model_name: model_name.into(),
            dimension,
            device: DeviceInfo::detect_cpu(),
        })
    }

    /// Generates the raw vector for one text
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut current_seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            // Linear congruential step, mixed with the position
            current_seed =
                (current_seed.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);

            // Map to [-1, 1]
            let value = (current_seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        embedding
    }
}

impl EmbeddingModel for HashEmbeddingModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
