//! Core chat session management.
//!
//! [`ChatSession`] owns every piece of mutable session state: the
//! conversation log, the attachment registry and the running usage totals.
//! Each state transition of the chat loop is one method here, so transitions
//! can be exercised in isolation.

use time::{OffsetDateTime, UtcOffset};

use crate::attachments::{Attachment, AttachmentRegistry};
use crate::chat::config::ChatConfig;
use crate::conversation::ConversationLog;
use crate::error::Result;
use crate::normalize::normalize;
use crate::observability::{
    ATTACHMENT_BYTES, ATTACHMENTS_FAILED, ATTACHMENTS_INGESTED, TURNS_COMPLETED, TURNS_FAILED,
};
use crate::service::{Completion, CompletionFailure, CompletionService};
use crate::types::{Model, Role, Usage};

/// A chat session that manages conversation state and service interactions.
pub struct ChatSession<S: CompletionService> {
    service: S,
    config: ChatConfig,
    log: ConversationLog,
    attachments: AttachmentRegistry,
    utc_offset: UtcOffset,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
    failed_request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// The number of files attached.
    pub attachment_count: usize,
    /// Completion calls that produced a reply.
    pub total_requests: u64,
    /// Completion calls that failed.
    pub failed_requests: u64,
    /// Usage summed over every call, failed ones included.
    pub total_usage: Usage,
    /// Usage of the most recent call, if any.
    pub last_turn_usage: Option<Usage>,
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session.
    ///
    /// Attachment timestamps are recorded in UTC until
    /// [`with_utc_offset`](Self::with_utc_offset) supplies the local offset.
    pub fn new(service: S, config: ChatConfig) -> Self {
        Self {
            service,
            config,
            log: ConversationLog::new(),
            attachments: AttachmentRegistry::new(),
            utc_offset: UtcOffset::UTC,
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
            failed_request_count: 0,
        }
    }

    /// Sets the offset attachment timestamps are recorded in.
    pub fn with_utc_offset(mut self, utc_offset: UtcOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Ingests the file at `path`.
    ///
    /// On success the file is recorded in the attachment registry and one
    /// user message carrying its normalized content is appended to the log.
    /// On failure neither the registry nor the log is touched.
    pub fn attach(&mut self, path: &str) -> Result<&Attachment> {
        let normalized = match normalize(path) {
            Ok(normalized) => normalized,
            Err(err) => {
                ATTACHMENTS_FAILED.click();
                tracing::warn!(path, error = %err, "attachment rejected");
                return Err(err);
            }
        };
        ATTACHMENTS_INGESTED.click();
        ATTACHMENT_BYTES.count(normalized.file_len as u64);
        tracing::info!(
            path,
            bytes = normalized.file_len,
            media_type = %normalized.media_type,
            textual = normalized.is_textual(),
            "attachment ingested"
        );

        self.log.append(Role::User, normalized.to_message_body());
        let added_at = OffsetDateTime::now_utc().to_offset(self.utc_offset);
        Ok(self
            .attachments
            .record(path, normalized.media_type, added_at))
    }

    /// Sends a user message and waits for the reply.
    ///
    /// The user message is appended before the call and stays in the log even
    /// when the call fails, so a retry resubmits it alongside the new input.
    pub async fn send(&mut self, user_input: &str) -> std::result::Result<Completion, CompletionFailure> {
        self.log.append(Role::User, user_input);
        tracing::debug!(messages = self.log.len(), model = %self.config.model, "submitting turn");

        let outcome = self
            .service
            .complete(self.config.model.as_str(), self.log.snapshot())
            .await;

        match outcome {
            Ok(completion) => {
                self.log.append(Role::Assistant, completion.text.as_str());
                self.record_usage(completion.usage, true);
                TURNS_COMPLETED.click();
                Ok(completion)
            }
            Err(failure) => {
                self.record_usage(failure.usage, false);
                TURNS_FAILED.click();
                tracing::warn!(error = %failure.error, "turn failed; user message retained");
                Err(failure)
            }
        }
    }

    /// The conversation log.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The attachment registry.
    pub fn attachments(&self) -> &AttachmentRegistry {
        &self.attachments
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.log.len()
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.log.len(),
            attachment_count: self.attachments.len(),
            total_requests: self.request_count,
            failed_requests: self.failed_request_count,
            total_usage: self.usage_totals,
            last_turn_usage: self.last_turn_usage,
        }
    }

    fn record_usage(&mut self, usage: Usage, succeeded: bool) {
        self.last_turn_usage = Some(usage);
        self.usage_totals = self.usage_totals + usage;
        if succeeded {
            self.request_count = self.request_count.saturating_add(1);
        } else {
            self.failed_request_count = self.failed_request_count.saturating_add(1);
        }
    }
}
