use serde::{Deserialize, Serialize};

use crate::types::{Message, Role, Usage};

/// Request body for `POST chat/completions`.
///
/// Borrows the conversation so that a turn never clones the whole log.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest<'a> {
    /// The model identifier.
    pub model: &'a str,

    /// The entire conversation, oldest first.
    pub messages: &'a [Message],

    /// Upper bound on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Create a request for `model` over `messages`.
    pub fn new(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            max_tokens: None,
        }
    }

    /// Set the upper bound on generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response body for `POST chat/completions`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// Identifier the service assigned to this completion.
    #[serde(default)]
    pub id: Option<String>,

    /// The model that actually served the request.
    #[serde(default)]
    pub model: Option<String>,

    /// Candidate replies; only the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token accounting, when the service reports it.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One candidate reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: ChoiceMessage,

    /// Why generation stopped (`stop`, `length`, `content_filter`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message inside a [`Choice`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    /// Always `assistant` for chat completions.
    pub role: Role,

    /// The reply text; absent for refusals and tool calls.
    #[serde(default)]
    pub content: Option<String>,

    /// Refusal text, when the model declined to answer.
    #[serde(default)]
    pub refusal: Option<String>,
}

impl ChatCompletionResponse {
    /// Returns the usage counters, zero-valued when absent.
    pub fn usage_or_default(&self) -> Usage {
        self.usage.unwrap_or_default()
    }

    /// Returns the text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        let message = &self.choices.first()?.message;
        message.content.as_deref().or(message.refusal.as_deref())
    }
}
