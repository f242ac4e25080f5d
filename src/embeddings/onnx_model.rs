// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence transformer exported to ONNX (e.g. BAAI/bge-large-en-v1.5,
//! NovaSearch/stella_en_400M_v5) through ONNX Runtime.
//!
//! Features:
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - HuggingFace tokenization with truncation and batch padding
//! - `token_type_ids` fed only to graphs that declare it
//! - Token-level outputs pooled per [`Pooling`]; sentence-level outputs used as-is
//! - Output dimensionality discovered by a probe inference at load time

use super::errors::{EmbeddingError, Result};
use super::{DeviceInfo, EmbeddingModel, Pooling};
use ndarray::{Array2, Axis, Ix2, Ix3};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Value;
use std::borrow::Cow;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Default maximum sequence length for BERT-style encoders
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Tokenized, padded batch ready for the session
struct EncodedBatch {
    batch_size: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
}

/// ONNX-based sentence embedding model
///
/// The session is held behind a mutex: ONNX Runtime needs `&mut Session` to
/// run, so inferences are serialized per process.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    max_length: usize,
    pad_id: i64,
    pooling: Pooling,
    needs_token_type_ids: bool,
    device: DeviceInfo,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("pooling", &self.pooling)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the ONNX graph and tokenizer from disk.
    ///
    /// Blocking: reads model files and runs a probe inference to discover the
    /// output dimensionality.
    ///
    /// # Errors
    /// - Model or tokenizer file missing / invalid
    /// - ONNX Runtime initialization fails on both CUDA and CPU
    /// - The graph's output is neither `[batch, seq, hidden]` nor `[batch, hidden]`
    pub fn load<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        pooling: Pooling,
        max_length: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            return Err(EmbeddingError::FileNotFound(model_path.display().to_string()));
        }
        if !tokenizer_path.exists() {
            return Err(EmbeddingError::FileNotFound(
                tokenizer_path.display().to_string(),
            ));
        }
        if max_length == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "max_length must be greater than 0".to_string(),
            ));
        }

        let (session, device) = Self::create_session(model_path)?;

        let needs_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");
        debug!(
            "ONNX graph inputs: {:?}",
            session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
        );

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(format!("Failed to load tokenizer: {}", e)))?;
        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id as i64)
            .unwrap_or(0);
        // Batches are padded by hand to the longest sequence
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::Tokenizer(format!("Failed to set truncation: {}", e)))?;

        let mut model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: 0,
            max_length,
            pad_id,
            pooling,
            needs_token_type_ids,
            device,
        };

        let probe = model.run(&["validation test".to_string()])?;
        model.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if model.dimension == 0 {
            return Err(EmbeddingError::UnexpectedOutput { shape: vec![1, 0] });
        }

        info!(
            "✅ ONNX embedding model {} loaded ({} dims, {} pooling, {})",
            model.model_name, model.dimension, model.pooling, model.device
        );

        Ok(model)
    }

    /// Creates the session on CUDA, or on CPU when CUDA is unavailable
    fn create_session(model_path: &Path) -> Result<(Session, DeviceInfo)> {
        info!("🚀 Initializing ONNX embedding model with GPU support");
        info!("   Attempting CUDA execution provider...");

        // Registration failure must surface, otherwise the session quietly runs on CPU
        let cuda = CUDAExecutionProvider::default().build().error_on_failure();
        match Self::build_session(model_path, cuda) {
            Ok(session) => {
                info!("✅ CUDA execution provider initialized successfully!");
                Ok((session, DeviceInfo::detect_cuda()))
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {}", e);
                warn!("   Falling back to CPU execution provider");
                let session =
                    Self::build_session(model_path, CPUExecutionProvider::default().build())?;
                Ok((session, DeviceInfo::detect_cpu()))
            }
        }
    }

    fn build_session(model_path: &Path, provider: ExecutionProviderDispatch) -> Result<Session> {
        Session::builder()
            .map_err(session_error)?
            .with_execution_providers([provider])
            .map_err(session_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(session_error)?
            .with_intra_threads(4)
            .map_err(session_error)?
            .commit_from_file(model_path)
            .map_err(session_error)
    }

    fn encode(&self, texts: &[String]) -> Result<EncodedBatch> {
        let encodings = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| EmbeddingError::Tokenizer(format!("Tokenization failed: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let seq_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0)
            .max(1);

        let mut input_ids = Vec::with_capacity(texts.len() * seq_len);
        let mut attention_mask = Vec::with_capacity(texts.len() * seq_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().map(|&m| m as i64));

            let padding_needed = seq_len - ids.len();
            input_ids.extend(std::iter::repeat(self.pad_id).take(padding_needed));
            attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        Ok(EncodedBatch {
            batch_size: texts.len(),
            seq_len,
            input_ids,
            attention_mask,
        })
    }

    /// Tokenizes, runs the session and pools. Does not check `self.dimension`.
    fn run(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch = self.encode(texts)?;
        let shape = (batch.batch_size, batch.seq_len);

        let input_ids = Array2::from_shape_vec(shape, batch.input_ids)?;
        let attention_mask = Array2::from_shape_vec(shape, batch.attention_mask.clone())?;

        let mut inputs = ort::inputs![
            "input_ids" => Value::from_array(input_ids)?,
            "attention_mask" => Value::from_array(attention_mask)?
        ];
        if self.needs_token_type_ids {
            let token_type_ids = Array2::<i64>::zeros(shape);
            inputs.push((
                Cow::from("token_type_ids"),
                SessionInputValue::from(Value::from_array(token_type_ids)?),
            ));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::LockPoisoned)?;
        let outputs = session.run(inputs)?;

        // Output names differ between exports; the first output carries the embeddings
        let output = outputs[0].try_extract_array::<f32>()?;
        let output_shape = output.shape().to_vec();

        match output.ndim() {
            // [batch, seq_len, hidden]: token embeddings, pool per sequence
            3 => {
                let tokens = output
                    .into_dimensionality::<Ix3>()
                    .map_err(|_| EmbeddingError::UnexpectedOutput {
                        shape: output_shape.clone(),
                    })?;
                Ok((0..batch.batch_size)
                    .map(|idx| {
                        let start = idx * batch.seq_len;
                        let mask = &batch.attention_mask[start..start + batch.seq_len];
                        self.pooling.apply(tokens.index_axis(Axis(0), idx), mask)
                    })
                    .collect())
            }
            // [batch, hidden]: the graph already pooled
            2 => {
                let sentences = output
                    .into_dimensionality::<Ix2>()
                    .map_err(|_| EmbeddingError::UnexpectedOutput {
                        shape: output_shape.clone(),
                    })?;
                Ok(sentences.outer_iter().map(|row| row.to_vec()).collect())
            }
            _ => Err(EmbeddingError::UnexpectedOutput {
                shape: output_shape,
            }),
        }
    }

    /// Counts tokens (including special tokens) after truncation
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenizer(format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }
}

fn session_error(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Session(e.to_string())
}

impl EmbeddingModel for OnnxEmbeddingModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.run(texts)?;

        for (index, emb) in embeddings.iter().enumerate() {
            if emb.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    index,
                    expected: self.dimension,
                    actual: emb.len(),
                });
            }
        }

        Ok(embeddings)
    }
}
