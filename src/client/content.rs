//! Content decoding — normalize a [`ContentItem`] into caller-usable text.
//!
//! Decoding is total: every item yields some text plus a media type, with
//! the declared media type winning over the per-variant default.

use super::types::ContentItem;

/// Default media type for textual content with no declared type.
const DEFAULT_TEXT_MIME: &str = "text/plain";

/// Default media type for binary content with no declared type.
const DEFAULT_BLOB_MIME: &str = "application/octet-stream";

/// A content item reduced to its text form and media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub text: String,
    pub mime_type: String,
}

/// Decode a content item into text plus its media type.
///
/// Three tiers, in order: textual content uses its text verbatim; binary
/// content uses the payload verbatim; anything else is stringified.
pub fn decode(item: &ContentItem) -> DecodedContent {
    match item {
        ContentItem::Text { text, mime_type } => DecodedContent {
            text: text.clone(),
            mime_type: mime_type
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_MIME.to_string()),
        },
        ContentItem::Blob { blob, mime_type } => DecodedContent {
            text: blob.clone(),
            mime_type: mime_type
                .clone()
                .unwrap_or_else(|| DEFAULT_BLOB_MIME.to_string()),
        },
        ContentItem::Other(value) => DecodedContent {
            text: value.to_string(),
            mime_type: DEFAULT_TEXT_MIME.to_string(),
        },
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
