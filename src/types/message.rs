use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user or ingested from an attachment.
    User,

    /// A reply produced by the completion service.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged entry in the conversation.
///
/// Messages are immutable once created; the conversation log only ever appends
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serialization() {
        let message = Message::user("Hello");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": "Hello"
            })
        );

        let message = Message::assistant("Hi there");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "role": "assistant",
                "content": "Hi there"
            })
        );
    }

    #[test]
    fn message_deserialization() {
        let message: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "ok"})).unwrap();
        assert_eq!(message, Message::assistant("ok"));
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
