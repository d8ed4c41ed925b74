//! Conversation UI components for the chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod indicator;
pub mod manager;

pub use commands::{get_help_text, parse_slash_command, ParsedCommand, SlashCommand};
pub use composer::{ComposerResult, ConversationComposer};
pub use history::{sanitize_display_text, DisplayMessage, MessageList};
pub use indicator::BusyIndicator;
pub use manager::{ControllerAction, ConversationController};
