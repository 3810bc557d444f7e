//! Embedding client tests against a mock Ollama endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::EmbeddingsConfig;
use crate::embeddings::api::{ApiConfig, EmbeddingApiClient};
use crate::embeddings::EmbeddingProvider;
use crate::error::CoachError;

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        model: "nomic-embed-text".to_string(),
        timeout_secs: 5,
    }
}

fn provider_config(base_url: &str, dimensions: usize) -> EmbeddingsConfig {
    EmbeddingsConfig {
        base_url: base_url.to_string(),
        model: "nomic-embed-text".to_string(),
        dimensions,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_api_client_sends_model_and_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({
            "model": "nomic-embed-text",
            "prompt": "How many sets for hypertrophy?"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": [0.1, 0.2, 0.3] })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let embedding = client.embed("How many sets for hypertrophy?").await.unwrap();

    assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.embed("squat form").await.unwrap_err();

    match err {
        CoachError::EmbeddingUnavailable(msg) => assert!(msg.contains("model not loaded")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vectors": [] })))
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.embed("deadlift").await.unwrap_err();
    assert!(matches!(err, CoachError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    // Nothing listens on port 9 on test hosts.
    let client = EmbeddingApiClient::new(test_config("http://127.0.0.1:9")).unwrap();
    let err = client.embed("bench press").await.unwrap_err();
    assert!(matches!(err, CoachError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn test_slow_service_times_out_as_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "embedding": [0.1, 0.2, 0.3] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(ApiConfig {
        timeout_secs: 1,
        ..test_config(&mock_server.uri())
    })
    .unwrap();
    let err = client.embed("row technique").await.unwrap_err();
    assert!(matches!(err, CoachError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn test_provider_rejects_wrong_dimensions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [0.5, 0.5] })))
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 3)).unwrap();
    let err = provider.embed("rows").await.unwrap_err();
    assert!(matches!(err, CoachError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn test_provider_rejects_empty_vector() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [] })))
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 3)).unwrap();
    assert!(provider.embed("rows").await.is_err());
}

#[tokio::test]
async fn test_provider_returns_matching_vector() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0, 0.0, 0.0] })),
        )
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 3)).unwrap();
    assert_eq!(provider.dimensions(), 3);
    assert_eq!(provider.embed("rows").await.unwrap(), vec![1.0, 0.0, 0.0]);
}
