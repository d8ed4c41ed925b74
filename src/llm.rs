//! Gemini `generateContent` client.
//!
//! The request always carries the persona preamble and the whole transcript;
//! nothing is streamed. Sampling settings are fixed.

use crate::error::CompletionError;
use crate::events::{Role, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const TEMPERATURE: f64 = 0.85;
pub const MAX_OUTPUT_TOKENS: u32 = 300;

// ── request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

impl Content {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content::new(turn.role, turn.text.clone())
    }
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            generation_config: GenerationConfig::default(),
        }
    }
}

// ── response ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl GenerateContentResponse {
    fn into_first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a raw response body.
pub fn extract_reply(body: &str) -> Result<String, CompletionError> {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(GenerateContentResponse::into_first_text)
        .ok_or(CompletionError::InvalidResponse)
}

fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error?
        .message
}

// ── service ─────────────────────────────────────────────────────────────────

/// Anything that can turn a prompt into a persona reply
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, CompletionError>;
}

/// HTTP client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, CompletionError> {
        // No timeout: a request runs until the service answers or the
        // connection fails.
        let client = reqwest::Client::builder()
            .user_agent(concat!("tragedian/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, CompletionError> {
        debug!(
            model = %self.model,
            turns = request.contents.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Gemini API returned an error status");
            return Err(CompletionError::api(status.as_u16(), extract_error_message(&body)));
        }

        let reply = extract_reply(&body);
        if reply.is_err() {
            warn!("Gemini API response had no candidate text");
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let request = GenerateContentRequest::new(vec![
            Content::new(Role::User, "Hello"),
            Content::new(Role::Character, "Well met"),
        ]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "Well met");
        assert_eq!(json["generationConfig"]["temperature"], 0.85);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 300);
    }

    #[test]
    fn reply_is_first_part_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Alas, fair mortal..."}, {"text": "ignored"}]}},
                {"content": {"parts": [{"text": "also ignored"}]}}
            ]
        }"#;
        assert_eq!(extract_reply(body).unwrap(), "Alas, fair mortal...");
    }

    #[test]
    fn missing_pieces_are_invalid() {
        for body in [
            "{}",
            r#"{"candidates": []}"#,
            r#"{"candidates": [{}]}"#,
            r#"{"candidates": [{"content": {}}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{}]}}]}"#,
            "not json",
        ] {
            assert!(
                matches!(extract_reply(body), Err(CompletionError::InvalidResponse)),
                "body should be rejected: {body}"
            );
        }
    }

    #[test]
    fn error_message_is_read_from_body() {
        let body = r#"{"error": {"code": 403, "message": "invalid key"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("invalid key"));
        assert_eq!(extract_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn endpoint_formatting() {
        let client = GeminiClient::new("http://localhost:9999/v1beta/", "gemini-2.5-flash").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let prefixed = GeminiClient::new("http://localhost:9999", "models/gemini-1.5-pro").unwrap();
        assert_eq!(
            prefixed.endpoint(),
            "http://localhost:9999/models/gemini-1.5-pro:generateContent"
        );
    }
}
