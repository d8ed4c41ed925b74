use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::time::Instant;

/// "<persona> is composing..." line shown while a reply is outstanding
#[derive(Debug, Clone)]
pub struct BusyIndicator {
    persona: String,
    started: Instant,
}

impl BusyIndicator {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            started: Instant::now(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    fn dots(&self) -> &'static str {
        match (self.started.elapsed().as_millis() / 300) % 4 {
            0 => ".  ",
            1 => ".. ",
            2 => "...",
            _ => "   ",
        }
    }

    pub fn line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled("🎭 ", Style::default().fg(Color::Green)),
            Span::styled(
                format!("{} is composing a reply", self.persona),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::ITALIC),
            ),
            Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
        ])
    }
}
