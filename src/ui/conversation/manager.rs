use crate::config::UiConfig;
use crate::error::{ChatError, CompletionError};
use crate::llm::CompletionService;
use crate::persona::{Persona, PersonaCatalog};
use crate::session::ChatSession;
use crate::ui::conversation::{
    get_help_text, ComposerResult, ConversationComposer, MessageList, ParsedCommand, SlashCommand,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Actions that can be requested by the conversation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerAction {
    None,
    Exit,
}

/// The one request allowed in flight
struct PendingCompletion {
    user_text: String,
    persona: &'static Persona,
    epoch: u64,
    receiver: oneshot::Receiver<Result<String, CompletionError>>,
}

/// Drives a conversation: owns the session, the visible message list and the
/// composer, and runs one completion request per user turn.
pub struct ConversationController {
    catalog: PersonaCatalog,
    session: ChatSession,
    messages: MessageList,
    composer: ConversationComposer,
    client: Arc<dyn CompletionService>,
    pending: Option<PendingCompletion>,
    alert: Option<String>,
}

impl ConversationController {
    pub fn new(
        catalog: PersonaCatalog,
        session: ChatSession,
        client: Arc<dyn CompletionService>,
    ) -> Self {
        let mut composer = ConversationComposer::new(session.persona().name);
        composer.set_focus(true);

        Self {
            catalog,
            session,
            messages: MessageList::new(),
            composer,
            client,
            pending: None,
            alert: None,
        }
    }

    pub fn with_ui(mut self, ui: &UiConfig) -> Self {
        self.messages.set_show_timestamps(ui.show_timestamps);
        self.composer.set_max_lines(ui.max_composer_lines);
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Blocking warning, if one is showing
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_credential(&mut self, credential: &str) {
        self.session.set_credential(credential);
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch to the named persona, starting the conversation over.
    pub fn select_persona(&mut self, name: &str) -> Result<(), ChatError> {
        let persona = self
            .catalog
            .get(name)
            .ok_or_else(|| ChatError::UnknownPersona(name.trim().to_string()))?;
        self.apply_persona(persona);
        Ok(())
    }

    pub fn cycle_persona(&mut self) {
        let next = self.catalog.next_after(self.session.persona());
        self.apply_persona(next);
    }

    fn apply_persona(&mut self, persona: &'static Persona) {
        self.session.switch_persona(persona);
        self.messages.clear();
        self.composer.set_persona(persona.name);
        info!(persona = persona.name, "persona selected");
    }

    /// Show the user's text and ask the persona for a reply.
    ///
    /// Blank input is ignored. The credential is checked before anything is
    /// shown, so a refused turn leaves the list and the composer untouched.
    pub fn submit_user_turn(&mut self, text: &str) -> Result<(), ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if !self.session.has_credential() {
            self.raise_missing_credential();
            return Err(ChatError::MissingCredential);
        }
        if self.session.is_busy() {
            debug!("turn refused while a reply is outstanding");
            return Err(ChatError::Busy);
        }

        self.messages.add_user_message(text);
        self.composer.clear();
        self.request_completion(text.to_string())
    }

    /// Issue the single outbound request for `user_text`.
    pub fn request_completion(&mut self, user_text: String) -> Result<(), ChatError> {
        let api_key = match self.session.begin_request() {
            Ok(key) => key,
            Err(ChatError::MissingCredential) => {
                self.raise_missing_credential();
                return Err(ChatError::MissingCredential);
            }
            Err(err) => return Err(err),
        };

        let persona = self.session.persona();
        let request = self.session.build_request(&user_text);
        info!(
            persona = persona.name,
            history = self.session.transcript().len(),
            "requesting completion"
        );

        let client = Arc::clone(&self.client);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = client.generate(&api_key, &request).await;
            let _ = tx.send(result);
        });

        self.pending = Some(PendingCompletion {
            user_text,
            persona,
            epoch: self.session.epoch(),
            receiver: rx,
        });
        self.messages.set_busy(Some(persona.name));
        self.composer.set_enabled(false);
        Ok(())
    }

    /// Handle the reply if it has arrived. Returns true when one was handled.
    pub fn poll_completion(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(CompletionError::Abandoned),
        };

        if let Some(pending) = self.pending.take() {
            self.finish_completion(pending, result);
        }
        true
    }

    /// Wait for the outstanding reply, if any, and handle it.
    pub async fn wait_for_completion(&mut self) -> bool {
        let Some(mut pending) = self.pending.take() else {
            return false;
        };

        let result = (&mut pending.receiver)
            .await
            .unwrap_or(Err(CompletionError::Abandoned));
        self.finish_completion(pending, result);
        true
    }

    fn finish_completion(
        &mut self,
        pending: PendingCompletion,
        result: Result<String, CompletionError>,
    ) {
        self.session.finish_request();
        self.messages.set_busy(None);
        self.composer.set_enabled(true);
        self.composer.set_focus(true);

        if pending.epoch != self.session.epoch() {
            info!(
                persona = pending.persona.name,
                "discarding reply for a persona no longer selected"
            );
            return;
        }

        match result {
            Ok(reply) => {
                info!(persona = pending.persona.name, chars = reply.len(), "reply received");
                self.messages.add_character_message(pending.persona.name, &reply);
                self.session.record_exchange(pending.user_text, reply);
            }
            Err(err) => {
                warn!(persona = pending.persona.name, error = %err, "completion failed");
                self.messages.add_system_message(&format!(
                    "[Alas, a mystical interference hath occurred: {}]",
                    err
                ));
            }
        }
    }

    fn raise_missing_credential(&mut self) {
        warn!("turn refused: no API key");
        self.alert = Some(ChatError::MissingCredential.to_string());
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ControllerAction {
        if key.kind != KeyEventKind::Press {
            return ControllerAction::None;
        }

        if self.alert.is_some() {
            self.dismiss_alert();
            return ControllerAction::None;
        }

        if key.code == KeyCode::Tab {
            self.cycle_persona();
            return ControllerAction::None;
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(text) => {
                if let Err(err) = self.submit_user_turn(&text) {
                    debug!(error = %err, "turn not submitted");
                }
                ControllerAction::None
            }
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ControllerAction::None,
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    /// Handle slash commands
    pub fn handle_slash_command(&mut self, command: ParsedCommand) -> ControllerAction {
        match command.command {
            SlashCommand::Persona => {
                match command.argument() {
                    Some(name) => {
                        if let Err(err) = self.select_persona(name) {
                            let known = self.catalog.names().join(", ");
                            self.messages
                                .add_system_message(&format!("{}. The company: {}", err, known));
                        }
                    }
                    None => self.cycle_persona(),
                }
                ControllerAction::None
            }
            SlashCommand::Personas => {
                let mut listing = String::from("The company of players:");
                for persona in self.catalog.iter() {
                    let marker = if persona.name == self.session.persona().name {
                        "▶"
                    } else {
                        " "
                    };
                    listing.push_str(&format!("\n{} {}", marker, persona.name));
                }
                self.messages.add_system_message(&listing);
                ControllerAction::None
            }
            SlashCommand::Key => {
                self.session.set_credential(command.argument().unwrap_or_default());
                let notice = if self.session.has_credential() {
                    "API key set for this session."
                } else {
                    "API key cleared."
                };
                info!(has_key = self.session.has_credential(), "credential updated");
                self.messages.add_system_message(notice);
                ControllerAction::None
            }
            SlashCommand::Help => {
                self.messages.add_system_message(&get_help_text());
                ControllerAction::None
            }
            SlashCommand::Quit => ControllerAction::Exit,
        }
    }

    /// Render header, message list, composer and any alert
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(self.composer.desired_height()),
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.messages.render(chunks[1], buf);
        self.composer.render(chunks[2], buf);

        if let Some(alert) = &self.alert {
            render_alert(alert, area, buf);
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let persona = self.session.persona();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!("🎭 {}", persona.name),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));

        Paragraph::new(Line::from(Span::styled(
            persona.intro,
            Style::default().add_modifier(Modifier::ITALIC),
        )))
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
    }
}

fn render_alert(message: &str, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(60, 7, area);
    Clear.render(popup, buf);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("⚠️  Warning")
                .style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true })
        .render(popup, buf);
}

/// A rect `percent_x` wide and `height` tall in the middle of `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let width = width.max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
