use crate::ui::conversation::commands::{parse_slash_command, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset, always on a char boundary
    pub cursor_position: usize,
}

/// Multi-line input box
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    persona: String,
    has_focus: bool,
    enabled: bool,
    max_lines: u16,
}

impl ConversationComposer {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            persona: persona.into(),
            has_focus: false,
            enabled: true,
            max_lines: 6,
        }
    }

    /// Handle key input. Keys are ignored while the composer is disabled.
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press || !self.enabled {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                let newline = key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT | KeyModifiers::CONTROL);
                if newline {
                    self.insert_char('\n');
                } else if let Some(command) = parse_slash_command(&self.state.content) {
                    self.clear();
                    return ComposerResult::Command(command);
                } else {
                    return ComposerResult::Submitted(self.state.content.clone());
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.state.content.remove(prev);
                    self.state.cursor_position = prev;
                }
            }
            KeyCode::Delete => {
                if self.state.cursor_position < self.state.content.len() {
                    self.state.content.remove(self.state.cursor_position);
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.state.cursor_position = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.state.cursor_position = next;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.content.len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor
    pub fn insert_str(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let text = text.replace("\r\n", "\n");
        self.state.content.insert_str(self.state.cursor_position, &text);
        self.state.cursor_position += text.len();
    }

    fn insert_char(&mut self, c: char) {
        self.state.content.insert(self.state.cursor_position, c);
        self.state.cursor_position += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        let cursor = self.state.cursor_position;
        self.state.content[..cursor]
            .chars()
            .next_back()
            .map(|c| cursor - c.len_utf8())
    }

    fn next_boundary(&self) -> Option<usize> {
        let cursor = self.state.cursor_position;
        self.state.content[cursor..]
            .chars()
            .next()
            .map(|c| cursor + c.len_utf8())
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_persona(&mut self, persona: impl Into<String>) {
        self.persona = persona.into();
    }

    pub fn set_max_lines(&mut self, max_lines: u16) {
        self.max_lines = max_lines.max(1);
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn clear(&mut self) {
        self.state.content.clear();
        self.state.cursor_position = 0;
    }

    /// Rows needed to show the content, borders included
    pub fn desired_height(&self) -> u16 {
        let lines = self.state.content.split('\n').count() as u16;
        lines.clamp(1, self.max_lines) + 2
    }

    fn title(&self) -> String {
        if self.enabled {
            format!("✒️  Speak to {}", self.persona)
        } else {
            format!("⏳ Awaiting {}", self.persona)
        }
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .style(if self.has_focus && self.enabled {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder = if self.enabled {
                "Address the player... (/help for commands)"
            } else {
                "The player is composing a reply..."
            };
            let placeholder_line = Line::from(vec![Span::styled(
                placeholder,
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
            return;
        }

        let mut content = self.state.content.clone();
        if self.has_focus && self.enabled {
            content.insert(self.state.cursor_position.min(content.len()), '▌');
        }

        // Keep the tail visible once the content outgrows the box.
        let lines: Vec<&str> = content.split('\n').collect();
        let start = lines.len().saturating_sub(inner_area.height as usize);
        for (i, line_text) in lines[start..].iter().enumerate() {
            let line = Line::from(vec![Span::raw(*line_text)]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}
