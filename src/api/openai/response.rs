// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response types for the OpenAI-compatible POST /v1/embeddings

use crate::service::EmbeddingBatch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiEmbeddingsResponse {
    /// Always "list"
    pub object: String,
    pub model: String,
    pub data: Vec<EmbeddingData>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// Always "embedding"
    pub object: String,
    pub index: usize,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

impl Usage {
    /// Approximates token usage as whitespace-separated words
    pub fn from_texts(texts: &[String]) -> Self {
        let words: usize = texts.iter().map(|t| t.split_whitespace().count()).sum();
        Self {
            prompt_tokens: words,
            total_tokens: words,
        }
    }
}

impl OpenAiEmbeddingsResponse {
    pub fn from_batch(batch: EmbeddingBatch, usage: Usage) -> Self {
        let data = batch
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| EmbeddingData {
                object: "embedding".to_string(),
                index,
                embedding,
            })
            .collect();

        Self {
            object: "list".to_string(),
            model: batch.model,
            data,
            usage,
        }
    }
}
