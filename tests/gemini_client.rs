mod common;

use common::{GeminiMockServer, TEST_KEY};
use tragedian::events::Role;
use tragedian::llm::{Content, GenerateContentRequest};
use tragedian::{CompletionError, CompletionService, GeminiClient};

fn request(text: &str) -> GenerateContentRequest {
    GenerateContentRequest::new(vec![Content::new(Role::User, text)])
}

#[tokio::test]
async fn returns_first_candidate_text() {
    let server = GeminiMockServer::new().await;
    server.mock_reply("Alas, fair mortal...", 1).await;

    let reply = server
        .client()
        .generate(TEST_KEY, &request("hello"))
        .await
        .unwrap();
    assert_eq!(reply, "Alas, fair mortal...");

    let bodies = server.request_bodies().await;
    assert_eq!(bodies[0]["contents"][0]["parts"][0]["text"], "hello");
    assert_eq!(bodies[0]["generationConfig"]["temperature"], 0.85);
    assert_eq!(bodies[0]["generationConfig"]["maxOutputTokens"], 300);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = GeminiMockServer::new().await;
    server.mock_error(403, "invalid key").await;

    let err = server
        .client()
        .generate("wrong", &request("hello"))
        .await
        .unwrap_err();
    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "invalid key");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unstructured_error_falls_back_to_status() {
    let server = GeminiMockServer::new().await;
    server.mock_raw(503, "<html>upstream unavailable</html>").await;

    let err = server
        .client()
        .generate(TEST_KEY, &request("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API Error HTTP 503");
}

#[tokio::test]
async fn missing_candidates_are_invalid() {
    let server = GeminiMockServer::new().await;
    server.mock_raw(200, r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).await;

    let err = server
        .client()
        .generate(TEST_KEY, &request("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::InvalidResponse));
    assert_eq!(err.to_string(), "Invalid response format from Gemini API");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let client = GeminiClient::new("http://127.0.0.1:1", "gemini-2.5-flash").unwrap();
    let err = client.generate(TEST_KEY, &request("hello")).await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)));
}
