//! The attachment registry.
//!
//! The registry is a display index of every file ingested during the session.
//! It is independent of the conversation log: the file's content lives in the
//! log as a user message, while the registry keeps only metadata for `/list`.

use std::fmt::Write as _;

use time::OffsetDateTime;

/// Shown by `/list` when nothing has been attached.
pub const NO_ATTACHMENTS: &str = "No attachments in context";

/// Metadata for one ingested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    media_type: String,
    added_at: OffsetDateTime,
}

impl Attachment {
    /// Create a new attachment record.
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        added_at: OffsetDateTime,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            added_at,
        }
    }

    /// The path as the user typed it.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The detected media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// When the file was ingested.
    pub fn added_at(&self) -> OffsetDateTime {
        self.added_at
    }

    /// The ingestion time as `HH:MM:SS` in the timestamp's own offset.
    pub fn added_at_hms(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.added_at.hour(),
            self.added_at.minute(),
            self.added_at.second()
        )
    }
}

/// Insertion-ordered log of attachments.  Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct AttachmentRegistry {
    attachments: Vec<Attachment>,
}

impl AttachmentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attachment and return the stored record.
    pub fn record(
        &mut self,
        filename: impl Into<String>,
        media_type: impl Into<String>,
        added_at: OffsetDateTime,
    ) -> &Attachment {
        self.attachments
            .push(Attachment::new(filename, media_type, added_at));
        &self.attachments[self.attachments.len() - 1]
    }

    /// Returns every attachment in ingestion order, or `None` when there are
    /// no attachments at all.
    pub fn list(&self) -> Option<&[Attachment]> {
        if self.attachments.is_empty() {
            None
        } else {
            Some(&self.attachments)
        }
    }

    /// Number of attachments recorded.
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// Returns true if nothing has been attached.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Iterate in ingestion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter()
    }

    /// Renders the registry for `/list`.
    ///
    /// Entries are 1-indexed; the empty registry renders [`NO_ATTACHMENTS`].
    pub fn render_listing(&self) -> String {
        let Some(attachments) = self.list() else {
            return NO_ATTACHMENTS.to_string();
        };
        let mut out = String::from("Active attachments:");
        for (i, attachment) in attachments.iter().enumerate() {
            let _ = write!(
                out,
                "\n{}. {} ({}) - added {}",
                i + 1,
                attachment.filename(),
                attachment.media_type(),
                attachment.added_at_hms()
            );
        }
        out
    }
}
