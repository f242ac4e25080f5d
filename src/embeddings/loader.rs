// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Resident model loading
//!
//! Resolves model artefacts (local directory or HuggingFace Hub download),
//! picks the pooling mode and constructs the one model instance the process
//! serves for its whole lifetime.

use super::errors::{EmbeddingError, Result};
use super::onnx_model::DEFAULT_MAX_LENGTH;
use super::{EmbeddingModel, HashEmbeddingModel, OnnxEmbeddingModel, Pooling};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Sentence-transformers pooling config location inside a model repo
const POOLING_CONFIG_FILE: &str = "1_Pooling/config.json";

/// Which implementation serves embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    Onnx,
    /// Deterministic hash vectors; no model files needed
    Hash,
}

impl FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onnx" => Ok(ModelBackend::Onnx),
            "hash" => Ok(ModelBackend::Hash),
            other => Err(format!("unknown backend '{}' (expected onnx or hash)", other)),
        }
    }
}

/// Everything needed to bring up the resident model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    /// HuggingFace repo id, also reported as the model name
    pub id: String,
    pub revision: String,
    /// Load files from this directory instead of the Hub
    pub local_dir: Option<PathBuf>,
    /// Hub cache directory (hf-hub default when unset)
    pub cache_dir: Option<PathBuf>,
    /// ONNX graph path relative to the repo / local directory
    pub onnx_file: String,
    pub tokenizer_file: String,
    /// Overrides the pooling mode detected from the repo
    pub pooling: Option<Pooling>,
    pub max_length: usize,
    pub backend: ModelBackend,
    /// Output dimensionality of the hash backend
    pub hash_dims: usize,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            id: "BAAI/bge-large-en-v1.5".to_string(),
            revision: "main".to_string(),
            local_dir: None,
            cache_dir: None,
            onnx_file: "onnx/model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            pooling: None,
            max_length: DEFAULT_MAX_LENGTH,
            backend: ModelBackend::Onnx,
            hash_dims: 1024,
        }
    }
}

/// Local paths of the artefacts a model needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub pooling_config: Option<PathBuf>,
}

impl ModelSpec {
    /// Finds the model files, downloading them from the Hub if needed. Blocking.
    pub fn resolve_files(&self) -> Result<ModelFiles> {
        if let Some(dir) = &self.local_dir {
            info!("📂 Loading model files from {}", dir.display());
            let pooling_config = dir.join(POOLING_CONFIG_FILE);
            return Ok(ModelFiles {
                model: dir.join(&self.onnx_file),
                tokenizer: dir.join(&self.tokenizer_file),
                pooling_config: pooling_config.exists().then_some(pooling_config),
            });
        }

        info!(
            "📥 Fetching {} ({}) from the HuggingFace Hub",
            self.id, self.revision
        );

        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(cache_dir) = &self.cache_dir {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        let api = builder.build().map_err(|e| EmbeddingError::DownloadFailed {
            repo: self.id.clone(),
            file: String::new(),
            reason: e.to_string(),
        })?;
        let repo = api.repo(Repo::with_revision(
            self.id.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));

        let fetch = |file: &str| {
            repo.get(file).map_err(|e| EmbeddingError::DownloadFailed {
                repo: self.id.clone(),
                file: file.to_string(),
                reason: e.to_string(),
            })
        };

        let model = fetch(&self.onnx_file)?;
        // Large exports keep weights in a sidecar next to the graph
        if repo.get(&format!("{}_data", self.onnx_file)).is_ok() {
            info!("   Fetched external weights for {}", self.onnx_file);
        }
        let tokenizer = fetch(&self.tokenizer_file)?;
        let pooling_config = repo.get(POOLING_CONFIG_FILE).ok();

        Ok(ModelFiles {
            model,
            tokenizer,
            pooling_config,
        })
    }

    /// Explicit override, then the repo's pooling config, then CLS
    pub fn resolve_pooling(&self, files: &ModelFiles) -> Pooling {
        if let Some(pooling) = self.pooling {
            return pooling;
        }
        match files
            .pooling_config
            .as_deref()
            .and_then(Pooling::from_config_file)
        {
            Some(pooling) => pooling,
            None => {
                warn!("No usable pooling config for {}; defaulting to cls", self.id);
                Pooling::Cls
            }
        }
    }
}

/// Loads the resident model described by `spec`.
///
/// File downloads and ONNX session creation are blocking, so they run on the
/// blocking pool.
pub async fn load_model(spec: ModelSpec) -> Result<Arc<dyn EmbeddingModel>> {
    match spec.backend {
        ModelBackend::Hash => {
            info!(
                "Using deterministic hash backend ({} dims) for {}",
                spec.hash_dims, spec.id
            );
            let model = HashEmbeddingModel::new(spec.id, spec.hash_dims)?;
            Ok(Arc::new(model))
        }
        ModelBackend::Onnx => {
            let model = tokio::task::spawn_blocking(move || {
                let files = spec.resolve_files()?;
                let pooling = spec.resolve_pooling(&files);
                OnnxEmbeddingModel::load(
                    spec.id.clone(),
                    files.model,
                    files.tokenizer,
                    pooling,
                    spec.max_length,
                )
            })
            .await
            .map_err(|e| EmbeddingError::TaskFailed(e.to_string()))??;
            Ok(Arc::new(model))
        }
    }
}
