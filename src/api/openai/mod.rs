// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OpenAI-compatible embeddings API (POST /v1/embeddings)

pub mod handler;
pub mod request;
pub mod response;

pub use handler::openai_embeddings_handler;
pub use request::{EmbeddingInput, OpenAiEmbeddingsRequest};
pub use response::{EmbeddingData, OpenAiEmbeddingsResponse, Usage};
