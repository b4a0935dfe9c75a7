//! MCP client error types.

use thiserror::Error;

/// Errors that can occur during MCP client operations.
///
/// Only `ConnectionFailed`, `AlreadyConnected`, and `NotConnected` ever
/// reach callers of [`McpClient`](super::McpClient). The remaining
/// variants are internal to the protocol layer: the client converts them
/// into the operation's soft-failure value (empty listing, empty string,
/// or an error-shaped [`ToolResult`](super::ToolResult)) at the
/// operation boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport acquisition or handshake failed during `connect`.
    #[error("connection to {endpoint} failed: {reason}")]
    ConnectionFailed {
        endpoint: String,
        reason: String,
    },

    /// `connect` was called while a connection is already active.
    #[error("already connected to {endpoint}; disconnect first")]
    AlreadyConnected {
        endpoint: String,
    },

    /// An operation was attempted without an active connection.
    #[error("not connected to a server")]
    NotConnected,

    /// HTTP/stream-level communication error.
    #[error("transport error: {reason}")]
    Transport {
        reason: String,
    },

    /// Malformed or unexpected response payload.
    #[error("protocol error: {reason}")]
    Protocol {
        reason: String,
    },

    /// The server returned a JSON-RPC error response.
    #[error("server error [{code}]: {message}")]
    Server {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The initialize exchange failed on an otherwise healthy transport.
    #[error("handshake failed: {reason}")]
    Handshake {
        reason: String,
    },
}

impl ClientError {
    /// Whether this error is fatal to the connection attempt itself,
    /// as opposed to a single operation.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed { .. } | ClientError::Handshake { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_endpoint() {
        let err = ClientError::ConnectionFailed {
            endpoint: "http://localhost:8080/mcp".into(),
            reason: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://localhost:8080/mcp"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_is_connect_failure() {
        assert!(ClientError::ConnectionFailed {
            endpoint: "".into(),
            reason: "".into()
        }
        .is_connect_failure());
        assert!(ClientError::Handshake { reason: "".into() }.is_connect_failure());
        assert!(!ClientError::NotConnected.is_connect_failure());
        assert!(!ClientError::Transport { reason: "".into() }.is_connect_failure());
    }
}
