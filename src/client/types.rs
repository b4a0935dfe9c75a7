//! Shared types for the MCP client.
//!
//! JSON-RPC 2.0 message types, MCP protocol structures, and the uniform
//! tool-call result shape surfaced to callers.

use serde::{Deserialize, Serialize};

// ─── JSON-RPC 2.0 ───────────────────────────────────────────────────────────

/// JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: u64, method: &str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

// ─── MCP Protocol Types ──────────────────────────────────────────────────────

/// Protocol revision sent in the `initialize` request.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Payload of a successful `initialize` response.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(default, alias = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: serde_json::Value,
    #[serde(default, alias = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}

/// Server identity returned in the initialize response.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// A server-side callable tool, as reported by `tools/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A URI-addressed readable item, as reported by `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    #[serde(default)]
    pub description: String,
}

/// Payload of a `tools/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Payload of a `resources/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResourcesResult {
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// One unit of response payload.
///
/// Built once at the deserialization boundary so downstream code matches
/// on a closed set of variants instead of probing for field presence.
/// `Other` absorbs anything that carries neither a `text` nor a `blob`
/// field, which keeps decoding total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    /// Textual content with an optional declared media type.
    Text {
        text: String,
        #[serde(
            default,
            rename = "mimeType",
            skip_serializing_if = "Option::is_none"
        )]
        mime_type: Option<String>,
    },
    /// Binary content, carried as the server sent it.
    Blob {
        blob: String,
        #[serde(
            default,
            rename = "mimeType",
            skip_serializing_if = "Option::is_none"
        )]
        mime_type: Option<String>,
    },
    /// Anything else the server produced.
    Other(serde_json::Value),
}

/// Payload of a `tools/call` response.
///
/// Canonical shape: `status` is always present after deserialization
/// (defaulting to `"success"` when the server omits it), and `content`
/// is empty whenever `status` is not `"success"`.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

fn default_status() -> String {
    "success".to_string()
}

/// Payload of a `resources/read` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceResult {
    #[serde(default)]
    pub contents: Vec<ContentItem>,
}

// ─── Tool Call Results ───────────────────────────────────────────────────────

/// `status` value signalling that the caller must re-authenticate.
pub const STATUS_LOGIN_REQUIRED: &str = "login_required";

/// Uniform result of a tool call, after interpretation.
///
/// Exactly one outcome at a time; [`into_value`](ToolResult::into_value)
/// renders the JSON shape callers branch on.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// The server emitted JSON-encoded text; this is the parsed value.
    Json(serde_json::Value),
    /// Plain text that did not parse as JSON.
    Text(String),
    /// The call had effect but returned no content.
    Success,
    /// Out-of-band signal: re-authenticate at `login_url` before retrying.
    LoginRequired { login_url: String },
    /// The call failed; the description replaces any payload.
    Error(String),
}

impl ToolResult {
    /// Render the JSON shape for this outcome.
    ///
    /// - `Json` → the parsed value itself
    /// - `Text` → `{"result": <text>}`
    /// - `Success` → `{"status": "success"}`
    /// - `LoginRequired` → `{"status": "login_required", "login_url": <url>}`
    /// - `Error` → `{"error": <description>}`
    pub fn into_value(self) -> serde_json::Value {
        match self {
            ToolResult::Json(value) => value,
            ToolResult::Text(text) => serde_json::json!({ "result": text }),
            ToolResult::Success => serde_json::json!({ "status": "success" }),
            ToolResult::LoginRequired { login_url } => serde_json::json!({
                "status": STATUS_LOGIN_REQUIRED,
                "login_url": login_url,
            }),
            ToolResult::Error(error) => serde_json::json!({ "error": error }),
        }
    }

    /// Whether this result is the login-required control signal.
    pub fn is_login_required(&self) -> bool {
        matches!(self, ToolResult::LoginRequired { .. })
    }
}

// ─── Standard JSON-RPC Error Codes ──────────────────────────────────────────

/// Well-known JSON-RPC error codes.
pub mod error_codes {
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
