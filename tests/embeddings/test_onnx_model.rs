// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests
//!
//! Require an exported sentence-transformer on disk, so they are ignored by
//! default. Point `EMBED_TEST_MODEL_DIR` at a directory containing
//! `onnx/model.onnx` and `tokenizer.json`, then run with `--ignored`.

use memoryrouter_embeddings::embeddings::{
    l2_norm, l2_normalize, load_model, EmbeddingModel, ModelSpec, OnnxEmbeddingModel, Pooling,
};
use std::path::PathBuf;

// Default location (bge-small-en-v1.5, 384 dims)
const DEFAULT_MODEL_DIR: &str = "/workspace/models/bge-small-en-v1.5";

fn model_dir() -> PathBuf {
    std::env::var("EMBED_TEST_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_DIR))
}

async fn load() -> std::sync::Arc<dyn EmbeddingModel> {
    let spec = ModelSpec {
        id: "test/onnx".to_string(),
        local_dir: Some(model_dir()),
        ..Default::default()
    };
    load_model(spec).await.expect("Failed to load ONNX model")
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (l2_norm(a) * l2_norm(b))
}

#[tokio::test]
#[ignore = "requires ONNX model files"]
async fn test_model_loads_and_reports_dimension() {
    let model = load().await;
    assert_eq!(model.model_name(), "test/onnx");
    assert!(model.dimension() > 0);
}

#[tokio::test]
#[ignore = "requires ONNX model files"]
async fn test_batch_matches_single() {
    let model = load().await;
    let texts = vec![
        "short".to_string(),
        "a considerably longer sentence that forces padding of the other inputs".to_string(),
    ];

    let batch = model.embed_batch(&texts).unwrap();
    let single = model.embed_batch(&texts[..1]).unwrap();

    assert_eq!(batch.len(), 2);
    assert!(cosine(&batch[0], &single[0]) > 0.999);
}

#[tokio::test]
#[ignore = "requires ONNX model files"]
async fn test_semantic_similarity() {
    let model = load().await;
    let texts = vec![
        "The cat sits on the mat".to_string(),
        "A cat is sitting on a mat".to_string(),
        "Quarterly revenue exceeded expectations".to_string(),
    ];

    let mut vectors = model.embed_batch(&texts).unwrap();
    vectors.iter_mut().for_each(|v| l2_normalize(v));

    assert!(cosine(&vectors[0], &vectors[1]) > cosine(&vectors[0], &vectors[2]));
}

#[tokio::test]
#[ignore = "requires ONNX model files"]
async fn test_long_input_truncated() {
    let dir = model_dir();
    let model = OnnxEmbeddingModel::load(
        "test/onnx",
        dir.join("onnx/model.onnx"),
        dir.join("tokenizer.json"),
        Pooling::Cls,
        16,
    )
    .unwrap();

    let long = "word ".repeat(2000);
    assert!(model.count_tokens(&long).unwrap() <= 16);
    assert_eq!(model.embed_batch(&[long]).unwrap().len(), 1);
}

#[test]
fn test_missing_files_fail() {
    let dir = tempfile::tempdir().unwrap();
    let result = OnnxEmbeddingModel::load(
        "missing",
        dir.path().join("model.onnx"),
        dir.path().join("tokenizer.json"),
        Pooling::Mean,
        128,
    );
    assert!(result.is_err());
}
