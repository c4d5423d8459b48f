//! Turning arbitrary files into conversation-safe text.
//!
//! A file's media type comes from two independent tiers composed with a
//! fallback: the extension table is consulted first and content sniffing runs
//! only when the extension is missing or unknown.  Textual media types
//! (`text/*`) pass through as text; everything else is base64 encoded with the
//! standard padded alphabet.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

mod sniff;

pub use sniff::{OCTET_STREAM, SNIFF_LEN, TEXT_PLAIN_UTF8, sniff_media_type};

/// A file rendered as conversation-safe text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The file's text, or the base64 encoding of its bytes.
    pub content: String,
    /// The detected media type.
    pub media_type: String,
    /// Size of the file as read from disk, before any encoding.
    pub file_len: usize,
}

impl Normalized {
    /// Returns true when `content` is the file's own text rather than base64.
    pub fn is_textual(&self) -> bool {
        is_textual(&self.media_type)
    }

    /// The body of the user message that carries this file.
    pub fn to_message_body(&self) -> String {
        format!("File content ({}):\n{}", self.media_type, self.content)
    }
}

/// Looks the extension of `path` up in the extension table.
///
/// Returns `None` when the path has no extension or the extension is unknown.
pub fn media_type_from_extension(path: &Path) -> Option<String> {
    path.extension()?;
    mime_guess::from_path(path)
        .first_raw()
        .map(|media_type| media_type.to_string())
}

/// Detects the media type of a file from its path and contents.
pub fn detect_media_type(path: &Path, bytes: &[u8]) -> String {
    media_type_from_extension(path).unwrap_or_else(|| sniff_media_type(bytes).to_string())
}

/// Returns true if and only if `media_type` is in the `text/*` family.
pub fn is_textual(media_type: &str) -> bool {
    media_type.starts_with("text/")
}

/// Normalizes bytes that have already been read from `path`.
pub fn normalize_bytes(path: &Path, bytes: Vec<u8>) -> Normalized {
    let media_type = detect_media_type(path, &bytes);
    let file_len = bytes.len();
    let content = if is_textual(&media_type) {
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    media_type = %media_type,
                    "text file is not valid UTF-8; replacing invalid sequences"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        }
    } else {
        STANDARD.encode(&bytes)
    };
    Normalized {
        content,
        media_type,
        file_len,
    }
}

/// Reads the file at `path` and normalizes it.
///
/// The whole file is loaded into memory.  A missing or unreadable file is an
/// [`Error::AttachmentRead`].
pub fn normalize(path: impl AsRef<Path>) -> Result<Normalized> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| Error::attachment_read(path, err))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read attachment");
    Ok(normalize_bytes(path, bytes))
}
