// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod openai;
pub mod server;

pub use embed::{embed_handler, EmbedRequest, EmbedResponse};
pub use errors::{ApiError, ErrorResponse, OpenAiError, OpenAiErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use openai::{openai_embeddings_handler, OpenAiEmbeddingsRequest, OpenAiEmbeddingsResponse};
pub use server::{create_router, ApiConfig, ApiServer, AppState};
