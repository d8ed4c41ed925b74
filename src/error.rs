use thiserror::Error;

/// Reasons the conversation controller refuses to start a turn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please enter a valid Gemini API key with /key before speaking.")]
    MissingCredential,

    #[error("a reply is still being awaited")]
    Busy,

    #[error("no persona named '{0}'")]
    UnknownPersona(String),
}

/// Failures of a single round-trip to the completion service
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Non-2xx status. `message` is the API's own error text when the body
    /// carries one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response format from Gemini API")]
    InvalidResponse,

    #[error("the request was abandoned before a reply arrived")]
    Abandoned,
}

impl CompletionError {
    pub fn api(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("API Error HTTP {}", status));
        CompletionError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_body_message() {
        let err = CompletionError::api(403, Some("invalid key".to_string()));
        assert_eq!(err.to_string(), "invalid key");
    }

    #[test]
    fn api_error_falls_back_to_status() {
        assert_eq!(CompletionError::api(500, None).to_string(), "API Error HTTP 500");
        assert_eq!(
            CompletionError::api(502, Some("  ".to_string())).to_string(),
            "API Error HTTP 502"
        );
    }
}
