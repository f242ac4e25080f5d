// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings (OpenAI-compatible) endpoint tests

use super::common::*;
use axum::http::StatusCode;
use memoryrouter_embeddings::api::ApiConfig;
use serde_json::json;

#[tokio::test]
async fn test_batch_input() {
    let (status, body) = post_json(
        test_router(),
        "/v1/embeddings",
        json!({ "input": ["hello world", "a longer piece of text"], "model": "text-embedding-3-small" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "list");
    // The loaded model is reported regardless of the requested one
    assert_eq!(body["model"], TEST_MODEL);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for (i, item) in data.iter().enumerate() {
        assert_eq!(item["object"], "embedding");
        assert_eq!(item["index"], i);
        assert_eq!(item["embedding"].as_array().unwrap().len(), TEST_DIMS);
    }

    assert_eq!(body["usage"]["prompt_tokens"], 7);
    assert_eq!(body["usage"]["total_tokens"], 7);
}

#[tokio::test]
async fn test_single_string_same_as_one_element_array() {
    let (status, single) = post_json(test_router(), "/v1/embeddings", json!({ "input": "hello" })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, array) = post_json(test_router(), "/v1/embeddings", json!({ "input": ["hello"] })).await;

    assert_eq!(single["data"], array["data"]);
    assert_eq!(single["usage"], array["usage"]);
    assert_eq!(single["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_embeddings_are_normalized() {
    let (_, body) = post_json(test_router(), "/v1/embeddings", json!({ "input": "unit vectors" })).await;
    let embedding: Vec<f32> = serde_json::from_value(body["data"][0]["embedding"].clone()).unwrap();
    assert!((l2_norm(&embedding) - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_missing_or_empty_input_rejected() {
    for request in [json!({}), json!({ "input": [] })] {
        let (status, body) = post_json(test_router(), "/v1/embeddings", request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "input required");
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["param"], "input");
    }
}

#[tokio::test]
async fn test_batch_limit_applies() {
    let input: Vec<String> = (0..101).map(|i| i.to_string()).collect();
    let (status, body) = post_json(test_router(), "/v1/embeddings", json!({ "input": input })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["message"], "max 100 inputs per request");
}

#[tokio::test]
async fn test_raised_batch_limit_accepts_larger_input() {
    let router = test_router_with(ApiConfig {
        max_batch_size: 150,
        ..Default::default()
    });
    let input: Vec<String> = (0..150).map(|i| format!("text {}", i)).collect();
    let (status, body) = post_json(router, "/v1/embeddings", json!({ "input": input })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 150);
}

#[tokio::test]
async fn test_base64_encoding_rejected() {
    let (status, body) = post_json(
        test_router(),
        "/v1/embeddings",
        json!({ "input": "x", "encoding_format": "base64" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["param"], "encoding_format");

    let (status, _) = post_json(
        test_router(),
        "/v1/embeddings",
        json!({ "input": "x", "encoding_format": "float" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
