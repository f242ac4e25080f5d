// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::config::ServiceConfig;
use crate::embeddings::{ModelBackend, Pooling};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Text embedding HTTP service
#[derive(Parser, Debug)]
#[command(name = "memoryrouter-embeddings")]
#[command(version)]
#[command(about = "Serves a pretrained text-embedding model over HTTP", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Load the model and serve HTTP (default)
    Serve,

    /// Fetch the model files into the Hub cache and exit
    Download,

    /// Ping a deployment's /health once and print the result
    Ping {
        /// Base URL of the deployment
        #[arg(long, env = "EMBED_KEEP_WARM_URL")]
        url: String,
    },
}

/// Settings that override the config file
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, env = "EMBED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (e.g. 0.0.0.0:8000)
    #[arg(long, env = "EMBED_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// HuggingFace model repo id
    #[arg(long, env = "EMBED_MODEL_ID")]
    pub model_id: Option<String>,

    #[arg(long, env = "EMBED_MODEL_REVISION")]
    pub revision: Option<String>,

    /// Load model files from a local directory instead of the Hub
    #[arg(long, env = "EMBED_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// HuggingFace Hub cache directory
    #[arg(long, env = "EMBED_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// ONNX graph path inside the model repo
    #[arg(long, env = "EMBED_ONNX_FILE")]
    pub onnx_file: Option<String>,

    #[arg(long, env = "EMBED_TOKENIZER_FILE")]
    pub tokenizer_file: Option<String>,

    /// Pooling override (cls or mean)
    #[arg(long, env = "EMBED_POOLING")]
    pub pooling: Option<Pooling>,

    /// Maximum tokens per input; longer inputs are truncated
    #[arg(long, env = "EMBED_MAX_LENGTH")]
    pub max_length: Option<usize>,

    /// Model backend (onnx or hash)
    #[arg(long, env = "EMBED_BACKEND")]
    pub backend: Option<ModelBackend>,

    /// Dimensionality of the hash backend
    #[arg(long, env = "EMBED_HASH_DIMS")]
    pub hash_dims: Option<usize>,

    #[arg(long, env = "EMBED_MAX_BATCH_SIZE")]
    pub max_batch_size: Option<usize>,

    #[arg(long, env = "EMBED_MAX_CONCURRENT_REQUESTS")]
    pub max_concurrent_requests: Option<usize>,

    #[arg(long, env = "EMBED_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Seconds between keep-warm pings (0 disables)
    #[arg(long, env = "EMBED_KEEP_WARM_SECS")]
    pub keep_warm_secs: Option<u64>,

    /// Ping this deployment instead of the local service
    #[arg(long, env = "EMBED_KEEP_WARM_URL")]
    pub keep_warm_url: Option<String>,

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "EMBED_LOG")]
    pub log: Option<String>,

    /// Emit JSON log lines
    #[arg(long, env = "EMBED_LOG_JSON")]
    pub log_json: bool,
}

impl ConfigArgs {
    /// Loads the config file (if any) and applies every flag that was set
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut ServiceConfig) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        set(&mut config.api.listen_addr, &self.listen_addr);
        set(&mut config.api.max_batch_size, &self.max_batch_size);
        set(&mut config.api.max_concurrent_requests, &self.max_concurrent_requests);
        if let Some(secs) = self.request_timeout_secs {
            config.api.request_timeout = Duration::from_secs(secs);
        }

        set(&mut config.model.id, &self.model_id);
        set(&mut config.model.revision, &self.revision);
        set(&mut config.model.onnx_file, &self.onnx_file);
        set(&mut config.model.tokenizer_file, &self.tokenizer_file);
        set(&mut config.model.max_length, &self.max_length);
        set(&mut config.model.backend, &self.backend);
        set(&mut config.model.hash_dims, &self.hash_dims);
        if self.model_dir.is_some() {
            config.model.local_dir = self.model_dir.clone();
        }
        if self.cache_dir.is_some() {
            config.model.cache_dir = self.cache_dir.clone();
        }
        if self.pooling.is_some() {
            config.model.pooling = self.pooling;
        }

        set(&mut config.keep_warm.interval_secs, &self.keep_warm_secs);
        if self.keep_warm_url.is_some() {
            config.keep_warm.url = self.keep_warm_url.clone();
        }

        set(&mut config.logging.filter, &self.log);
        if self.log_json {
            config.logging.json = true;
        }
    }
}
