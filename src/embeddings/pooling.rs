// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sentence pooling over token-level model outputs

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// How token embeddings `[seq_len, hidden]` collapse into one sentence vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// First token ([CLS]); used by the BGE family
    #[default]
    Cls,
    /// Attention-mask weighted mean over tokens
    Mean,
}

impl FromStr for Pooling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cls" => Ok(Pooling::Cls),
            "mean" => Ok(Pooling::Mean),
            other => Err(format!("unknown pooling mode '{}' (expected cls or mean)", other)),
        }
    }
}

/// Subset of sentence-transformers' `1_Pooling/config.json`
#[derive(Debug, Deserialize)]
struct PoolingConfig {
    #[serde(default)]
    pooling_mode_cls_token: bool,
    #[serde(default)]
    pooling_mode_mean_tokens: bool,
}

impl Pooling {
    /// Reads the pooling mode from a sentence-transformers pooling config.
    ///
    /// Returns `None` when the file is missing, unreadable or selects a mode
    /// this service does not implement.
    pub fn from_config_file(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        let config: PoolingConfig = serde_json::from_str(&raw).ok()?;
        debug!("Pooling config {}: {:?}", path.display(), config);

        if config.pooling_mode_cls_token {
            Some(Pooling::Cls)
        } else if config.pooling_mode_mean_tokens {
            Some(Pooling::Mean)
        } else {
            None
        }
    }

    /// Pools one sequence of token embeddings. `mask` holds one entry per row.
    pub fn apply(&self, tokens: ArrayView2<'_, f32>, mask: &[i64]) -> Vec<f32> {
        let seq_len = tokens.shape()[0];
        let hidden_dim = tokens.shape()[1];

        match self {
            Pooling::Cls => {
                if seq_len == 0 {
                    return vec![0.0; hidden_dim];
                }
                tokens.row(0).to_vec()
            }
            Pooling::Mean => {
                let mut pooled = vec![0.0f32; hidden_dim];
                let mut sum_mask = 0.0f32;

                for i in 0..seq_len {
                    let mask_value = mask.get(i).copied().unwrap_or(0) as f32;
                    if mask_value == 0.0 {
                        continue;
                    }
                    sum_mask += mask_value;
                    for (j, slot) in pooled.iter_mut().enumerate() {
                        *slot += tokens[[i, j]] * mask_value;
                    }
                }

                for val in &mut pooled {
                    *val /= sum_mask.max(1e-9);
                }
                pooled
            }
        }
    }
}

impl std::fmt::Display for Pooling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pooling::Cls => f.write_str("cls"),
            Pooling::Mean => f.write_str("mean"),
        }
    }
}
