// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for embedding model loading and inference
//!
//! Covers the whole lifecycle of the resident model:
//! - Artefact resolution (local directory or HuggingFace Hub download)
//! - Tokenizer and ONNX Runtime initialization
//! - Inference and output shape validation

use thiserror::Error;

/// Errors produced by the embedding models and the service wrapping them
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// A required model file is missing on disk
    #[error("Model file not found: {0}")]
    FileNotFound(String),

    /// Downloading an artefact from the HuggingFace Hub failed
    #[error("Failed to download {file} from {repo}: {reason}")]
    DownloadFailed {
        repo: String,
        file: String,
        reason: String,
    },

    /// Tokenizer could not be loaded or failed to encode input
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// ONNX Runtime reported an error
    #[error("ONNX Runtime error: {0}")]
    Runtime(#[from] ort::Error),

    /// An ONNX Runtime session could not be created
    #[error("Failed to create ONNX session: {0}")]
    Session(String),

    /// Tensor construction failed (shape mismatch)
    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The model produced output with an unexpected layout
    #[error("Unexpected model output shape {shape:?}")]
    UnexpectedOutput { shape: Vec<usize> },

    /// A produced vector does not have the model's dimensionality
    #[error("Dimension mismatch at index {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// The model returned a different number of vectors than inputs
    #[error("Model returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    /// Model configuration is invalid
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),

    /// The blocking inference task panicked or was cancelled
    #[error("Inference task failed: {0}")]
    TaskFailed(String),

    /// Session lock was poisoned by a panicking inference
    #[error("Model session lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;
