//! The conversation log.
//!
//! An append-only, insertion-ordered sequence of messages.  The whole log is
//! replayed to the completion service on every turn, so nothing here ever
//! removes or reorders an entry.

use crate::types::{Message, Role};

/// Ordered history of every message in the session.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its position in the log.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> usize {
        self.messages.push(Message::new(role, content));
        self.messages.len() - 1
    }

    /// The full log, oldest first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the log holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
