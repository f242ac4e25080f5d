// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Defaults, optionally overlaid by a TOML file, then by command-line flags
//! and `EMBED_*` environment variables (see [`crate::cli`]).
//!
//! ```toml
//! [api]
//! listen_addr = "0.0.0.0:8000"
//! max_batch_size = 100
//!
//! [model]
//! id = "BAAI/bge-large-en-v1.5"
//! onnx_file = "onnx/model.onnx"
//!
//! [keep_warm]
//! interval_secs = 240
//! ```

use crate::api::ApiConfig;
use crate::embeddings::ModelSpec;
use crate::keep_warm::KeepWarmConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api: ApiConfig,
    pub model: ModelSpec,
    pub keep_warm: KeepWarmConfig,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Parses a TOML document; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid configuration file")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Defaults, or the given file when present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
