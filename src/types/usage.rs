use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting reported by the completion service.
///
/// Every field defaults to zero, which is also what a failed call reports when
/// the service did not return counters.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// The number of tokens in the submitted conversation.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// The number of tokens in the generated reply.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Prompt plus completion, as reported by the service.
    #[serde(default)]
    pub total_tokens: u64,
}

impl Usage {
    /// Create a new `Usage` with explicit counters.
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Returns true when no counters were reported.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}
