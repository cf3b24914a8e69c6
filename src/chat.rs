use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Deck",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub is_error: bool,
    pub timestamp: DateTime<Local>,
}

/// In-memory conversation shown in the sidebar. Append-only, not persisted.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push_user(&mut self, text: String) {
        self.push(Sender::User, text, false);
    }

    pub fn push_assistant(&mut self, text: String) {
        self.push(Sender::Assistant, text, false);
    }

    /// Errors show up in the conversation in place of a reply.
    pub fn push_error(&mut self, text: String) {
        self.push(Sender::Assistant, text, true);
    }

    fn push(&mut self, sender: Sender, text: String, is_error: bool) {
        self.messages.push(ChatMessage {
            sender,
            text,
            is_error,
            timestamp: Local::now(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
