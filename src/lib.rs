// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod keep_warm;
pub mod logging;
pub mod monitoring;
pub mod service;
pub mod version;

pub use api::{create_router, ApiConfig, ApiServer, AppState};
pub use config::ServiceConfig;
pub use embeddings::{load_model, EmbeddingModel, ModelSpec};
pub use keep_warm::KeepWarm;
pub use service::{EmbeddingBatch, EmbeddingService, HealthStatus};
