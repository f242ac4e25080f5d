// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request type for the OpenAI-compatible POST /v1/embeddings

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// `input` accepts a single string or an array of strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl EmbeddingInput {
    pub fn into_texts(self) -> Vec<String> {
        match self {
            EmbeddingInput::Single(s) => vec![s],
            EmbeddingInput::Batch(v) => v,
        }
    }
}

/// Request body for POST /v1/embeddings
///
/// `model` and `user` are accepted for client compatibility; the loaded
/// model always serves the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiEmbeddingsRequest {
    #[serde(default)]
    pub input: Option<EmbeddingInput>,

    #[serde(default)]
    pub model: Option<String>,

    /// Only "float" is supported
    #[serde(default)]
    pub encoding_format: Option<String>,

    #[serde(default)]
    pub user: Option<String>,
}

impl OpenAiEmbeddingsRequest {
    /// Validates and returns the texts to embed
    pub fn into_texts(self, max_batch_size: usize) -> Result<Vec<String>, ApiError> {
        if let Some(format) = self.encoding_format.as_deref() {
            if format != "float" {
                return Err(ApiError::validation(
                    "encoding_format",
                    format!("unsupported encoding_format '{}' (only 'float')", format),
                ));
            }
        }

        let texts = self.input.map(EmbeddingInput::into_texts).unwrap_or_default();
        if texts.is_empty() {
            return Err(ApiError::validation("input", "input required"));
        }
        if texts.len() > max_batch_size {
            return Err(ApiError::validation(
                "input",
                format!("max {} inputs per request", max_batch_size),
            ));
        }

        Ok(texts)
    }
}
