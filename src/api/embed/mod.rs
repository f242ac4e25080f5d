// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! This module provides the POST /embed endpoint: a batch of texts in, one
//! vector per text out.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embed_handler;
pub use request::{EmbedRequest, DEFAULT_MAX_BATCH_SIZE};
pub use response::EmbedResponse;
