// Public modules
pub mod attachments;
pub mod chat;
pub mod client;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod observability;
pub mod service;
pub mod types;

// Re-exports
pub use attachments::{Attachment, AttachmentRegistry};
pub use client::CompletionClient;
pub use conversation::ConversationLog;
pub use error::{Error, Result};
pub use normalize::{Normalized, normalize};
pub use observability::register_biometrics;
pub use service::{Completion, CompletionFailure, CompletionService};
pub use types::*;
