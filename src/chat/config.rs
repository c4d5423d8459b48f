//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_API_URL;
use crate::types::Model;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Command-line arguments for the attache-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: chatgpt-4o-latest)", "MODEL")]
    pub model: Option<String>,

    /// Base URL of the chat completions API.
    #[arrrg(optional, "API base URL (default: https://api.openai.com/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: service default)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 120)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Base URL of the chat completions API.
    pub base_url: String,

    /// Optional cap on tokens per response.
    pub max_tokens: Option<u32>,

    /// How long to wait for the service before giving up on a turn.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: chatgpt-4o-latest
    /// - Base URL: https://api.openai.com/v1/
    /// - Max tokens: service default
    /// - Timeout: 120 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            base_url: DEFAULT_API_URL.to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = args
            .model
            .map(|s| Model::from(s.as_str()))
            .unwrap_or_default();

        ChatConfig {
            model,
            base_url: args.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            max_tokens: args.max_tokens,
            timeout: Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            use_color: !args.no_color,
        }
    }
}
