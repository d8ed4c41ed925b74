#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tragedian::{ChatSession, ConversationController, GeminiClient, PersonaCatalog};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "test-api-key";
pub const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

/// Mock Gemini endpoint
pub struct GeminiMockServer {
    server: MockServer,
}

impl GeminiMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> GeminiClient {
        GeminiClient::new(self.uri(), "gemini-2.5-flash").unwrap()
    }

    pub fn controller(&self, api_key: Option<&str>) -> ConversationController {
        let catalog = PersonaCatalog::default();
        let session = ChatSession::new(catalog.default_persona())
            .with_credential(api_key.map(str::to_string));
        ConversationController::new(catalog, session, Arc::new(self.client()))
    }

    /// Every generateContent call answers with `reply`
    pub async fn mock_reply(&self, reply: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", TEST_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(reply)))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Like `mock_reply` but the answer takes a while to arrive
    pub async fn mock_slow_reply(&self, reply: &str, delay: Duration, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_body(reply))
                    .set_delay(delay),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Answer with an error status and a Gemini-style error body
    pub async fn mock_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "code": status,
                    "message": message,
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer with an arbitrary raw body
    pub async fn mock_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Fail the test if any request reaches the server
    pub async fn expect_no_requests(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn request_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.body_json::<Value>().unwrap())
            .collect()
    }
}

pub fn reply_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            },
            "finishReason": "STOP"
        }]
    })
}
