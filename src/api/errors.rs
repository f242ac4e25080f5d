// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::embeddings::EmbeddingError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Error body for `/embed` and the other native routes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// OpenAI error envelope used by `/v1/embeddings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAiErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    UnprocessableEntity(String),
    UnsupportedMediaType(String),
    InternalError(String),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::ValidationError { .. } => "validation_error",
            ApiError::UnprocessableEntity(_) => "unprocessable_entity",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    /// Short human-readable message, without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidRequest(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::InternalError(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            ApiError::ValidationError { field, .. } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                Some(details)
            }
            _ => None,
        };

        ErrorResponse {
            error_type: self.error_type().to_string(),
            message: self.message().to_string(),
            details,
        }
    }

    pub fn to_openai_response(&self) -> OpenAiErrorResponse {
        let (error_type, param) = match self {
            ApiError::ValidationError { field, .. } => ("invalid_request_error", Some(field.clone())),
            ApiError::InvalidRequest(_)
            | ApiError::UnprocessableEntity(_)
            | ApiError::UnsupportedMediaType(_) => ("invalid_request_error", None),
            ApiError::InternalError(_) => ("server_error", None),
        };

        OpenAiErrorResponse {
            error: OpenAiErrorBody {
                message: self.message().to_string(),
                error_type: error_type.to_string(),
                param,
                code: None,
            },
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalError(_) => 500,
        }
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UnprocessableEntity(msg) => write!(f, "Unprocessable entity: {}", msg),
            ApiError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<EmbeddingError> for ApiError {
    fn from(e: EmbeddingError) -> Self {
        tracing::error!("Embedding failed: {}", e);
        ApiError::InternalError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::UnprocessableEntity(message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType(message),
            _ => ApiError::InvalidRequest(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_response())).into_response()
    }
}

/// Renders an [`ApiError`] in the OpenAI error envelope
#[derive(Debug)]
pub struct OpenAiError(pub ApiError);

impl From<ApiError> for OpenAiError {
    fn from(e: ApiError) -> Self {
        OpenAiError(e)
    }
}

impl From<EmbeddingError> for OpenAiError {
    fn from(e: EmbeddingError) -> Self {
        OpenAiError(e.into())
    }
}

impl From<JsonRejection> for OpenAiError {
    fn from(rejection: JsonRejection) -> Self {
        OpenAiError(rejection.into())
    }
}

impl IntoResponse for OpenAiError {
    fn into_response(self) -> Response {
        (self.0.status(), Json(self.0.to_openai_response())).into_response()
    }
}
