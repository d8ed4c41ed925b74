use serde::{Deserialize, Serialize};

/// Who authored a turn in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    /// The persona. Gemini calls this role "model".
    #[serde(rename = "model")]
    Character,
}

/// One message of the conversation remembered for context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn character(text: impl Into<String>) -> Self {
        Self {
            role: Role::Character,
            text: text.into(),
        }
    }
}

/// Where a displayed message came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOrigin {
    User,
    /// Reply spoken by the named persona
    Character(String),
    System,
}

impl MessageOrigin {
    pub fn label(&self) -> &str {
        match self {
            MessageOrigin::User => "You",
            MessageOrigin::Character(name) => name,
            MessageOrigin::System => "System",
        }
    }
}
