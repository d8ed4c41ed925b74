use crate::error::ChatError;
use crate::events::{Role, Turn};
use crate::llm::{Content, GenerateContentRequest};
use crate::persona::Persona;

/// Conversation state for one user: who they are talking to, what has been
/// said, and whether a reply is outstanding.
#[derive(Debug, Clone)]
pub struct ChatSession {
    persona: &'static Persona,
    transcript: Vec<Turn>,
    credential: Option<String>,
    busy: bool,
    /// Bumped on every persona switch so late replies can be recognised.
    epoch: u64,
}

impl ChatSession {
    pub fn new(persona: &'static Persona) -> Self {
        Self {
            persona,
            transcript: Vec::new(),
            credential: None,
            busy: false,
            epoch: 0,
        }
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        if let Some(key) = credential {
            self.set_credential(key);
        }
        self
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Select another persona. The transcript starts over; the credential and
    /// any in-flight request are left alone.
    pub fn switch_persona(&mut self, persona: &'static Persona) {
        self.persona = persona;
        self.transcript.clear();
        self.epoch += 1;
    }

    /// Blank input clears the credential.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        let credential = credential.into();
        let trimmed = credential.trim();
        self.credential = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Claim the single request slot. Returns the credential to send.
    pub fn begin_request(&mut self) -> Result<String, ChatError> {
        let key = self.credential.clone().ok_or(ChatError::MissingCredential)?;
        if self.busy {
            return Err(ChatError::Busy);
        }
        self.busy = true;
        Ok(key)
    }

    pub fn finish_request(&mut self) {
        self.busy = false;
    }

    /// Preamble, then every remembered turn, then the new user text.
    pub fn build_request(&self, user_text: &str) -> GenerateContentRequest {
        let mut contents = Vec::with_capacity(self.transcript.len() + 3);
        contents.push(Content::new(Role::User, self.persona.instruction()));
        contents.push(Content::new(Role::Character, self.persona.acknowledgement()));
        contents.extend(self.transcript.iter().map(Content::from));
        contents.push(Content::new(Role::User, user_text));
        GenerateContentRequest::new(contents)
    }

    /// Remember a completed exchange.
    pub fn record_exchange(&mut self, user_text: impl Into<String>, reply: impl Into<String>) {
        self.transcript.push(Turn::user(user_text));
        self.transcript.push(Turn::character(reply));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaCatalog;
    use pretty_assertions::assert_eq;

    fn session() -> ChatSession {
        ChatSession::new(PersonaCatalog::default().default_persona())
    }

    #[test]
    fn blank_credentials_are_absent() {
        let mut s = session();
        s.set_credential("   ");
        assert!(!s.has_credential());
        s.set_credential("  abc  ");
        assert_eq!(s.credential(), Some("abc"));
        s.set_credential("");
        assert_eq!(s.credential(), None);
    }

    #[test]
    fn request_slot_is_exclusive() {
        let mut s = session().with_credential(Some("key".into()));
        assert_eq!(s.begin_request(), Ok("key".to_string()));
        assert_eq!(s.begin_request(), Err(ChatError::Busy));
        s.finish_request();
        assert!(s.begin_request().is_ok());
    }

    #[test]
    fn request_slot_needs_a_credential() {
        let mut s = session();
        assert_eq!(s.begin_request(), Err(ChatError::MissingCredential));
        assert!(!s.is_busy());
    }

    #[test]
    fn payload_order_is_preamble_history_then_new_text() {
        let mut s = session();
        s.record_exchange("Who art thou?", "The Prince of Denmark.");

        let request = s.build_request("Why so sad?");
        let roles: Vec<Role> = request.contents.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Character, Role::User, Role::Character, Role::User]
        );
        assert!(request.contents[0].parts[0].text.contains("You are Hamlet"));
        assert_eq!(request.contents[2].parts[0].text, "Who art thou?");
        assert_eq!(request.contents[3].parts[0].text, "The Prince of Denmark.");
        assert_eq!(request.contents[4].parts[0].text, "Why so sad?");
    }

    #[test]
    fn switching_persona_forgets_the_transcript_but_not_the_key() {
        let catalog = PersonaCatalog::default();
        let mut s = session().with_credential(Some("key".into()));
        s.record_exchange("hi", "hail");
        let epoch = s.epoch();

        s.switch_persona(catalog.get("Juliet").unwrap());

        assert!(s.transcript().is_empty());
        assert_eq!(s.persona().name, "Juliet");
        assert_eq!(s.credential(), Some("key"));
        assert_ne!(s.epoch(), epoch);
    }
}
