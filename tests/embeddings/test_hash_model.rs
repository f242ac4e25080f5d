// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Hash model and loader tests (no model files needed)

use memoryrouter_embeddings::embeddings::{
    l2_norm, load_model, EmbeddingError, EmbeddingModel, HashEmbeddingModel, ModelBackend,
    ModelSpec,
};

#[test]
fn test_same_text_same_vector() {
    let model = HashEmbeddingModel::new("hash", 128).unwrap();
    let texts = vec!["stable".to_string(), "stable".to_string(), "other".to_string()];

    let vectors = model.embed_batch(&texts).unwrap();
    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[0], vectors[1]);
    assert_ne!(vectors[0], vectors[2]);
    assert!(vectors.iter().all(|v| v.len() == 128));
}

#[test]
fn test_values_in_range() {
    let model = HashEmbeddingModel::new("hash", 256).unwrap();
    let v = model.embed_one("range check");
    assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
    assert!(l2_norm(&v) > 1.0);
}

#[test]
fn test_zero_dimension_rejected() {
    assert!(matches!(
        HashEmbeddingModel::new("hash", 0),
        Err(EmbeddingError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_loader_builds_hash_backend() {
    let spec = ModelSpec {
        id: "dev/hash".to_string(),
        backend: ModelBackend::Hash,
        hash_dims: 1024,
        ..Default::default()
    };

    let model = load_model(spec).await.unwrap();
    assert_eq!(model.model_name(), "dev/hash");
    assert_eq!(model.dimension(), 1024);
    assert!(!model.device().is_gpu());
}
