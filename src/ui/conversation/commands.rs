use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Select a persona by name, or move to the next one
    Persona,
    /// List the available personas
    Personas,
    /// Set the API key for this session
    Key,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Persona => "speak with another persona (/persona <name>, or none to cycle)",
            SlashCommand::Personas => "list the company of players",
            SlashCommand::Key => "set the Gemini API key for this session (/key <key>)",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "p" | "as" | "character" => Some(SlashCommand::Persona),
        "list" | "cast" => Some(SlashCommand::Personas),
        "api-key" | "apikey" => Some(SlashCommand::Key),
        "h" | "?" => Some(SlashCommand::Help),
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("/{} - {}\n", command.command(), command.description()));
    }

    help.push_str("\nTab moves to the next persona. Enter sends; Alt+Enter or Shift+Enter starts a new line.");
    help.push_str("\nCtrl+C leaves at any time.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        let parsed = parse_slash_command("/persona King Lear").unwrap();
        assert_eq!(parsed.command, SlashCommand::Persona);
        assert_eq!(parsed.argument(), Some("King Lear"));

        let parsed = parse_slash_command("  /KEY abc123  ").unwrap();
        assert_eq!(parsed.command, SlashCommand::Key);
        assert_eq!(parsed.argument(), Some("abc123"));

        assert_eq!(parse_slash_command("/personas").unwrap().argument, None);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/as Juliet").unwrap().command, SlashCommand::Persona);
        assert_eq!(parse_slash_command("/cast").unwrap().command, SlashCommand::Personas);
    }

    #[test]
    fn plain_text_and_unknown_commands_are_not_commands() {
        assert!(parse_slash_command("to be or not").is_none());
        assert!(parse_slash_command("/soliloquy").is_none());
        assert!(parse_slash_command("/").is_none());
    }

    #[test]
    fn help_mentions_every_command() {
        let help = get_help_text();
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
