//! Converse with Shakespeare's tragic heroes through the Gemini API.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod persona;
pub mod session;
pub mod ui;

pub use config::Config;
pub use error::{ChatError, CompletionError};
pub use llm::{CompletionService, GeminiClient};
pub use persona::{Persona, PersonaCatalog};
pub use session::ChatSession;
pub use ui::conversation::ConversationController;
