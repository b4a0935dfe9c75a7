//! Tool-call result interpretation.
//!
//! Disambiguates a raw `tools/call` response between three outcomes:
//! a login-required control signal, an empty-content success marker, and
//! a payload to decode. Within the payload case, JSON-encoded text parses
//! to a structured value and everything else falls back to a plain-string
//! wrapper. Callers depend on receiving parsed JSON when the server emits
//! JSON-encoded text, so the branch order here is a contract.

use super::content;
use super::types::{CallToolResult, ContentItem, ToolResult, STATUS_LOGIN_REQUIRED};

/// Interpret a raw tool-call response into a uniform [`ToolResult`].
pub fn interpret(result: CallToolResult) -> ToolResult {
    // Control signal first: no content decoding happens for login_required.
    if result.status == STATUS_LOGIN_REQUIRED {
        return ToolResult::LoginRequired {
            login_url: result.login_url.unwrap_or_default(),
        };
    }

    // No content entries: the call had effect but nothing to report.
    let Some(first) = result.content.first() else {
        return ToolResult::Success;
    };

    // Only the first entry is consulted; ordering is server-defined.
    match first {
        ContentItem::Text { text, .. } => match serde_json::from_str(text) {
            Ok(parsed) => ToolResult::Json(parsed),
            Err(_) => ToolResult::Text(text.clone()),
        },
        other => ToolResult::Text(content::decode(other).text),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
