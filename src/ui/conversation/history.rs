//! Conversation history display component

use crate::events::MessageOrigin;
use crate::ui::conversation::BusyIndicator;
use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// A single message in the visible list
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub origin: MessageOrigin,
    /// Sanitized text; may contain `\n`
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Ordered list of displayed messages plus the busy indicator, which always
/// renders after the newest message.
#[derive(Debug, Clone)]
pub struct MessageList {
    messages: Vec<DisplayMessage>,
    busy: Option<BusyIndicator>,
    show_timestamps: bool,
}

impl Default for MessageList {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageList {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            busy: None,
            show_timestamps: true,
        }
    }

    pub fn set_show_timestamps(&mut self, show: bool) {
        self.show_timestamps = show;
    }

    pub fn push(&mut self, origin: MessageOrigin, text: &str) {
        self.messages.push(DisplayMessage {
            origin,
            text: sanitize_display_text(text),
            timestamp: Local::now(),
        });
    }

    pub fn add_user_message(&mut self, text: &str) {
        self.push(MessageOrigin::User, text);
    }

    pub fn add_character_message(&mut self, persona: &str, text: &str) {
        self.push(MessageOrigin::Character(persona.to_string()), text);
    }

    pub fn add_system_message(&mut self, text: &str) {
        self.push(MessageOrigin::System, text);
    }

    /// Drop every message. The busy indicator stays.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&DisplayMessage> {
        self.messages.last()
    }

    pub fn set_busy(&mut self, persona: Option<&str>) {
        self.busy = persona.map(BusyIndicator::new);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Every rendered line, oldest first, wrapped to `width`.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines = Vec::new();
        for message in &self.messages {
            all_lines.extend(self.render_message(message, width));
            all_lines.push(Line::from(""));
        }
        if let Some(busy) = &self.busy {
            all_lines.push(busy.line());
        }
        all_lines
    }

    fn render_message(&self, message: &DisplayMessage, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let label_style = style_for(&message.origin).add_modifier(Modifier::BOLD);
        let mut header = vec![Span::styled(message.origin.label().to_string(), label_style)];
        if self.show_timestamps {
            header.push(Span::styled(
                format!("  {}", message.timestamp.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(header));

        let body_style = style_for(&message.origin);
        for paragraph in message.text.split('\n') {
            for wrapped in wrap_text(paragraph, width.saturating_sub(2) as usize) {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(wrapped, body_style),
                ]));
            }
        }

        lines
    }
}

fn style_for(origin: &MessageOrigin) -> Style {
    match origin {
        MessageOrigin::User => Style::default().fg(Color::Blue),
        MessageOrigin::Character(_) => Style::default().fg(Color::Green),
        MessageOrigin::System => Style::default().fg(Color::Yellow),
    }
}

impl Widget for &MessageList {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("📜 Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.messages.is_empty() && self.busy.is_none() {
            let hint = Line::from(vec![Span::styled(
                "Speak, and the player shall answer. Enter sends, Alt+Enter adds a line.",
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &hint, inner_area.width);
            return;
        }

        // Bottom-anchored: the newest lines are always on screen.
        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Strip anything a terminal would interpret rather than print.
///
/// Escape sequences and control characters are removed, `\r\n` and lone `\r`
/// become `\n`, tabs become four spaces.
pub fn sanitize_display_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => match chars.next() {
                // CSI: parameters until a final byte in @..~
                Some('[') => {
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ST
                Some(']') => {
                    while let Some(c) = chars.next() {
                        if c == '\u{7}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push('\n');
                }
            }
            '\t' => out.push_str("    "),
            '\n' => out.push('\n'),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// Greedy word wrap on display columns (chars).
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count();
        if current_width > 0 && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }
        if current_width > 0 {
            current_line.push(' ');
            current_width += 1;
        }
        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}
