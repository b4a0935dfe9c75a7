//! Streamable HTTP transport.
//!
//! Carries JSON-RPC 2.0 messages to an MCP server endpoint:
//! - One HTTP POST per request or notification
//! - Responses arrive either as plain JSON or as a `text/event-stream`
//!   carrying one JSON-RPC message per SSE event
//! - The server-assigned `Mcp-Session-Id` header is captured on first
//!   contact and echoed on every later exchange

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as HttpClient;
use tokio::sync::RwLock;

use super::errors::ClientError;
use super::types::{error_codes, JsonRpcRequest, JsonRpcResponse};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total timeout for one request/response exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the server-assigned session identifier.
const SESSION_ID_HEADER: &str = "Mcp-Session-Id";

// ─── Request ID Generator ────────────────────────────────────────────────────

/// Global monotonic request ID counter.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID.
pub fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

// ─── Transport Contract ──────────────────────────────────────────────────────

/// A bidirectional JSON-RPC channel to one server.
///
/// The production implementation is [`StreamableHttpTransport`]; tests
/// substitute stubs to observe call counts and inject failures.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a request and wait for the matching response.
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, ClientError>;

    /// Send a notification (no response expected).
    async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), ClientError>;

    /// Release the channel. Idempotent: closing twice is a no-op.
    async fn close(&self) -> Result<(), ClientError>;
}

/// Yields a [`Transport`] for a server URL.
#[async_trait]
pub trait TransportProvider: Send + Sync {
    async fn open(&self, url: &str) -> Result<Arc<dyn Transport>, ClientError>;
}

// ─── Streamable HTTP Transport ───────────────────────────────────────────────

/// JSON-RPC transport over streamable HTTP.
#[derive(Debug)]
pub struct StreamableHttpTransport {
    endpoint: String,
    http: HttpClient,
    /// Server-assigned session id, captured from the first response.
    session_id: RwLock<Option<String>>,
    closed: AtomicBool,
}

impl StreamableHttpTransport {
    /// Build a transport for the given endpoint URL.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
            session_id: RwLock::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// POST one JSON-RPC message, returning the raw HTTP response.
    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response, ClientError> {
        let mut req = self
            .http
            .post(&self.endpoint)
            .json(body)
            .header("Accept", "application/json, text/event-stream");

        if let Some(ref id) = *self.session_id.read().await {
            req = req.header(SESSION_ID_HEADER, id);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Transport {
                    reason: format!("connection to {} failed: {e}", self.endpoint),
                }
            } else if e.is_timeout() {
                ClientError::Transport {
                    reason: format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs()),
                }
            } else {
                ClientError::Transport {
                    reason: e.to_string(),
                }
            }
        })?;

        // Capture the session id as soon as the server assigns one.
        if let Some(session) = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let mut slot = self.session_id.write().await;
            if slot.as_deref() != Some(session) {
                *slot = Some(session.to_string());
            }
        }

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport {
                reason: format!("HTTP {status}: {body_text}"),
            });
        }

        Ok(response)
    }

    /// Read an SSE response body until the message with `id` arrives.
    ///
    /// Other messages on the stream (server notifications, keep-alives)
    /// are skipped; stream end without a matching response is an error.
    async fn read_sse_response(
        response: reqwest::Response,
        id: u64,
    ) -> Result<JsonRpcResponse, ClientError> {
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();

        loop {
            // Drain complete SSE events from the buffer first.
            while let Some(event_end) = buffer.find("\n\n") {
                let event = buffer[..event_end].to_string();
                buffer.drain(..event_end + 2);

                let Some(data) = event_data(&event) else {
                    continue; // keep-alive or comment
                };
                match serde_json::from_str::<JsonRpcResponse>(&data) {
                    Ok(resp) if resp.id == id => return Ok(resp),
                    // A different id or a server-initiated message — skip.
                    _ => continue,
                }
            }

            match byte_stream.next().await {
                Some(Ok(bytes)) => buffer.push_str(&String::from_utf8_lossy(&bytes)),
                Some(Err(e)) => {
                    return Err(ClientError::Transport {
                        reason: format!("stream read error: {e}"),
                    });
                }
                None => {
                    return Err(ClientError::Protocol {
                        reason: format!("event stream ended without a response for id {id}"),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl Transport for StreamableHttpTransport {
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, ClientError> {
        let id = next_request_id();
        let req = JsonRpcRequest::new(id, method, params);
        let body = serde_json::to_value(&req).map_err(|e| ClientError::Transport {
            reason: format!("failed to serialize request: {e}"),
        })?;

        let response = self.post(&body).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("text/event-stream") {
            return Self::read_sse_response(response, id).await;
        }

        let body_text = response.text().await.map_err(|e| ClientError::Transport {
            reason: format!("failed to read response body: {e}"),
        })?;
        let resp: JsonRpcResponse =
            serde_json::from_str(&body_text).map_err(|e| ClientError::Protocol {
                reason: format!("invalid JSON-RPC response: {e}"),
            })?;

        if resp.id != id {
            return Err(ClientError::Protocol {
                reason: format!("response id {} does not match request id {id}", resp.id),
            });
        }

        Ok(resp)
    }

    async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), ClientError> {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        self.post(&notification).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(()); // already closed
        }

        // End the server-side session if one was assigned.
        let session = self.session_id.write().await.take();
        if let Some(session) = session {
            self.http
                .delete(&self.endpoint)
                .header(SESSION_ID_HEADER, &session)
                .send()
                .await
                .map_err(|e| ClientError::Transport {
                    reason: format!("failed to end session: {e}"),
                })?;
        }

        Ok(())
    }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Production provider: one [`StreamableHttpTransport`] per `open`.
#[derive(Debug, Default)]
pub struct StreamableHttpProvider;

#[async_trait]
impl TransportProvider for StreamableHttpProvider {
    async fn open(&self, url: &str) -> Result<Arc<dyn Transport>, ClientError> {
        Ok(Arc::new(StreamableHttpTransport::new(url)?))
    }
}

// ─── Response Helpers ────────────────────────────────────────────────────────

/// Concatenated `data:` payload of one SSE event, or `None` for events
/// with no data lines (comments, keep-alives).
fn event_data(event: &str) -> Option<String> {
    let mut data = String::new();
    let mut saw_data = false;

    for line in event.lines() {
        if let Some(rest) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) {
            data.push_str(rest.trim());
            saw_data = true;
        }
        // Ignore non-data lines (event types, ids, comments).
    }

    saw_data.then_some(data)
}

/// Extract the result from a JSON-RPC response, converting errors to `ClientError`.
pub fn extract_result(response: JsonRpcResponse) -> Result<serde_json::Value, ClientError> {
    if let Some(err) = response.error {
        return Err(ClientError::Server {
            code: err.code,
            message: err.message,
            data: err.data,
        });
    }

    response.result.ok_or(ClientError::Server {
        code: error_codes::INTERNAL_ERROR,
        message: "response missing both result and error".into(),
        data: None,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_request_id_is_monotonic() {
        let id1 = next_request_id();
        let id2 = next_request_id();
        assert!(id2 > id1);
    }

    #[test]
    fn test_extract_result_success() {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: 1,
            result: Some(serde_json::json!({"tools": []})),
            error: None,
        };
        let result = extract_result(resp).unwrap();
        assert!(result["tools"].is_array());
    }

    #[test]
    fn test_extract_result_error() {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: 1,
            result: None,
            error: Some(super::super::types::JsonRpcError {
                code: -32601,
                message: "Method not found".into(),
                data: None,
            }),
        };
        let err = extract_result(resp).unwrap_err();
        match err {
            ClientError::Server { code, message, .. } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            _ => panic!("expected Server error"),
        }
    }

    #[test]
    fn test_extract_result_missing_both() {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: 1,
            result: None,
            error: None,
        };
        let err = extract_result(resp).unwrap_err();
        assert!(matches!(err, ClientError::Server { .. }));
    }

    #[test]
    fn test_event_data_single_line() {
        let event = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}";
        assert_eq!(
            event_data(event).unwrap(),
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}"
        );
    }

    #[test]
    fn test_event_data_skips_non_data_lines() {
        let event = "event: message\nid: 7\ndata: {\"a\":1}";
        assert_eq!(event_data(event).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_event_data_concatenates_multiple_lines() {
        let event = "data: {\"a\":\ndata: 1}";
        assert_eq!(event_data(event).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_event_data_none_for_comment_events() {
        assert!(event_data(": keep-alive").is_none());
        assert!(event_data("event: ping").is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_without_session() {
        let transport = StreamableHttpTransport::new("http://localhost:9/mcp").unwrap();
        // No session id was ever assigned, so no DELETE is attempted and
        // both calls succeed without network activity.
        transport.close().await.unwrap();
        transport.close().await.unwrap();
    }
}
