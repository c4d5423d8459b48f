//! The seam between the chat session and whatever produces replies.
//!
//! The session never talks HTTP directly; it hands the whole conversation to a
//! [`CompletionService`] and gets back either a [`Completion`] or a
//! [`CompletionFailure`]. [`crate::CompletionClient`] is the networked
//! implementation; tests substitute scripted ones.

use std::error;
use std::fmt;

use crate::error::Error;
use crate::types::{Message, Usage};

/// A successful reply from the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The assistant's reply text.
    pub text: String,
    /// Token accounting for the call.
    pub usage: Usage,
}

impl Completion {
    /// Create a new completion.
    pub fn new(text: impl Into<String>, usage: Usage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// A failed call, with whatever usage counters the service managed to report.
///
/// `usage` is zero-valued unless the service returned counters alongside the
/// failure.
#[derive(Debug, Clone)]
pub struct CompletionFailure {
    /// Why the call failed.
    pub error: Error,
    /// Best-effort token accounting.
    pub usage: Usage,
}

impl CompletionFailure {
    /// Create a failure that carries usage counters.
    pub fn with_usage(error: Error, usage: Usage) -> Self {
        Self { error, usage }
    }
}

impl From<Error> for CompletionFailure {
    fn from(error: Error) -> Self {
        Self {
            error,
            usage: Usage::default(),
        }
    }
}

impl fmt::Display for CompletionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl error::Error for CompletionFailure {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Something that turns a conversation into an assistant reply.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Submit the full conversation and wait for the reply.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<Completion, CompletionFailure>;
}
