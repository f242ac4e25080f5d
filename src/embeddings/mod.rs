// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding models
//!
//! A single model is loaded at startup and kept resident for the lifetime of
//! the process. Two implementations share the [`EmbeddingModel`] trait:
//! - [`OnnxEmbeddingModel`]: sentence transformer exported to ONNX, run by
//!   ONNX Runtime (CUDA with CPU fallback)
//! - [`HashEmbeddingModel`]: deterministic hash-seeded vectors for development
//!   and tests

pub mod device;
pub mod errors;
pub mod hash_model;
pub mod loader;
pub mod onnx_model;
pub mod pooling;

pub use device::{DeviceInfo, DeviceKind};
pub use errors::EmbeddingError;
pub use hash_model::HashEmbeddingModel;
pub use loader::{load_model, ModelBackend, ModelSpec};
pub use onnx_model::OnnxEmbeddingModel;
pub use pooling::Pooling;

/// A resident text embedding model.
///
/// `embed_batch` is synchronous and may take a while on large batches; async
/// callers must move it onto the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait EmbeddingModel: Send + Sync {
    /// Model identifier reported in responses (e.g. "BAAI/bge-large-en-v1.5")
    fn model_name(&self) -> &str;

    /// Constant output dimensionality
    fn dimension(&self) -> usize;

    /// Device the model runs on
    fn device(&self) -> &DeviceInfo;

    /// Encodes `texts` into one raw (un-normalized) vector per input, in order
    fn embed_batch(&self, texts: &[String]) -> errors::Result<Vec<Vec<f32>>>;
}

/// Scales `vector` to unit L2 norm. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// L2 norm of `vector`
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}
