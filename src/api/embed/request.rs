// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Largest batch accepted by default
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Request body for POST /embed
///
/// # Example
/// ```json
/// {
///   "texts": ["Hello world", "Another text"],
///   "normalize": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text strings to embed (1..=max batch size items)
    pub texts: Vec<String>,

    /// Scale every vector to unit L2 norm (default: true)
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_normalize() -> bool {
    true
}

impl EmbedRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            normalize: true,
        }
    }

    /// Rejects empty batches and batches over `max_batch_size`
    pub fn validate(&self, max_batch_size: usize) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::validation("texts", "texts array required"));
        }

        if self.texts.len() > max_batch_size {
            return Err(ApiError::validation(
                "texts",
                format!("max {} texts per request", max_batch_size),
            ));
        }

        Ok(())
    }
}
