//! Protocol session over an established transport.
//!
//! A `Session` is only handed out after the `initialize` exchange
//! completes, so every operation on it runs on a handshake-verified
//! channel. Operations here are the raw typed layer: they propagate
//! errors, and the client converts those into soft-failure values.

use std::sync::Arc;
use std::time::Duration;

use super::errors::ClientError;
use super::transport::{extract_result, Transport};
use super::types::{
    CallToolResult, InitializeResult, ListResourcesResult, ListToolsResult, ReadResourceResult,
    ResourceDescriptor, ServerInfo, ToolDescriptor, PROTOCOL_VERSION,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Timeout for the initialize handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Session ─────────────────────────────────────────────────────────────────

/// One handshake-initialized request/response channel.
#[derive(Debug)]
pub struct Session {
    transport: Arc<dyn Transport>,
    server_info: Option<ServerInfo>,
}

impl Session {
    /// Perform the initialize exchange and return a ready session.
    ///
    /// Sends `initialize`, validates the response payload, then posts the
    /// `notifications/initialized` notification. Any failure leaves the
    /// transport untouched — releasing it is the caller's responsibility.
    pub async fn handshake(transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        let response = tokio::time::timeout(
            HANDSHAKE_TIMEOUT,
            transport.request("initialize", Some(params)),
        )
        .await
        .map_err(|_| ClientError::Handshake {
            reason: format!(
                "initialize timed out after {}s",
                HANDSHAKE_TIMEOUT.as_secs()
            ),
        })??;

        let result = extract_result(response)?;
        let init: InitializeResult =
            serde_json::from_value(result).map_err(|e| ClientError::Handshake {
                reason: format!("failed to parse initialize response: {e}"),
            })?;

        transport.notify("notifications/initialized", None).await?;

        if let Some(ref info) = init.server_info {
            tracing::info!(
                server = info.name.as_deref().unwrap_or("unknown"),
                version = info.version.as_deref().unwrap_or("unknown"),
                protocol = init.protocol_version.as_deref().unwrap_or("unspecified"),
                "handshake complete"
            );
        }

        Ok(Self {
            transport,
            server_info: init.server_info,
        })
    }

    /// Server identity reported during the handshake, if any.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    // ─── Protocol Operations ─────────────────────────────────────────────

    /// List the server's tools, in server-reported order.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ClientError> {
        let response = self.transport.request("tools/list", None).await?;
        let result = extract_result(response)?;
        let listing: ListToolsResult =
            serde_json::from_value(result).map_err(|e| ClientError::Protocol {
                reason: format!("failed to parse tools/list response: {e}"),
            })?;
        Ok(listing.tools)
    }

    /// List the server's resources, in server-reported order.
    pub async fn list_resources(&self) -> Result<Vec<ResourceDescriptor>, ClientError> {
        let response = self.transport.request("resources/list", None).await?;
        let result = extract_result(response)?;
        let listing: ListResourcesResult =
            serde_json::from_value(result).map_err(|e| ClientError::Protocol {
                reason: format!("failed to parse resources/list response: {e}"),
            })?;
        Ok(listing.resources)
    }

    /// Invoke a tool and return its raw result payload.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ClientError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });

        let response = self.transport.request("tools/call", Some(params)).await?;
        let result = extract_result(response)?;
        serde_json::from_value(result).map_err(|e| ClientError::Protocol {
            reason: format!("failed to parse tools/call response: {e}"),
        })
    }

    /// Read a resource and return its raw content entries.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ClientError> {
        let params = serde_json::json!({ "uri": uri });

        let response = self
            .transport
            .request("resources/read", Some(params))
            .await?;
        let result = extract_result(response)?;
        serde_json::from_value(result).map_err(|e| ClientError::Protocol {
            reason: format!("failed to parse resources/read response: {e}"),
        })
    }

    /// Retire the session: best-effort shutdown notification.
    ///
    /// The transport stays open — releasing it belongs to the lifecycle
    /// layer, which closes the transport after the session.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.transport.notify("shutdown", None).await
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::super::types::JsonRpcResponse;
    use super::*;

    /// Stub transport: scripted results, recorded requests.
    #[derive(Debug)]
    struct StubTransport {
        /// Result payloads handed out per request, in order.
        results: Mutex<VecDeque<Result<serde_json::Value, ClientError>>>,
        requests: Mutex<Vec<(String, Option<serde_json::Value>)>>,
        notifications: Mutex<Vec<String>>,
        close_calls: AtomicUsize,
    }

    impl StubTransport {
        fn new(results: Vec<Result<serde_json::Value, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                requests: Mutex::new(Vec::new()),
                notifications: Mutex::new(Vec::new()),
                close_calls: AtomicUsize::new(0),
            })
        }

        fn recorded_requests(&self) -> Vec<(String, Option<serde_json::Value>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn request(
            &self,
            method: &str,
            params: Option<serde_json::Value>,
        ) -> Result<JsonRpcResponse, ClientError> {
            self.requests
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            let result = self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ClientError::Transport {
                    reason: "no scripted response".into(),
                }))?;
            Ok(JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: 0,
                result: Some(result),
                error: None,
            })
        }

        async fn notify(
            &self,
            method: &str,
            _params: Option<serde_json::Value>,
        ) -> Result<(), ClientError> {
            self.notifications.lock().unwrap().push(method.to_string());
            Ok(())
        }

        async fn close(&self) -> Result<(), ClientError> {
            self.close_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn init_payload() -> serde_json::Value {
        serde_json::json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "serverInfo": {"name": "demo", "version": "0.1.0"},
        })
    }

    #[tokio::test]
    async fn test_handshake_parses_server_info_and_notifies() {
        let transport = StubTransport::new(vec![Ok(init_payload())]);
        let session = Session::handshake(transport.clone()).await.unwrap();

        assert_eq!(
            session.server_info().unwrap().name.as_deref(),
            Some("demo")
        );
        let requests = transport.recorded_requests();
        assert_eq!(requests[0].0, "initialize");
        assert_eq!(
            *transport.notifications.lock().unwrap(),
            vec!["notifications/initialized".to_string()]
        );
    }

    #[tokio::test]
    async fn test_handshake_propagates_transport_failure() {
        let transport = StubTransport::new(vec![Err(ClientError::Transport {
            reason: "connection refused".into(),
        })]);
        let err = Session::handshake(transport).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_list_tools_preserves_server_order() {
        let transport = StubTransport::new(vec![
            Ok(init_payload()),
            Ok(serde_json::json!({
                "tools": [
                    {"name": "zeta", "description": "last in name order"},
                    {"name": "alpha", "description": "first in name order"},
                ]
            })),
        ]);
        let session = Session::handshake(transport).await.unwrap();

        let tools = session.list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_call_tool_sends_name_and_arguments() {
        let transport = StubTransport::new(vec![
            Ok(init_payload()),
            Ok(serde_json::json!({"content": []})),
        ]);
        let session = Session::handshake(transport.clone()).await.unwrap();

        session
            .call_tool("fetch_net_worth", serde_json::json!({"currency": "USD"}))
            .await
            .unwrap();

        let requests = transport.recorded_requests();
        let (method, params) = &requests[1];
        assert_eq!(method, "tools/call");
        let params = params.as_ref().unwrap();
        assert_eq!(params["name"], "fetch_net_worth");
        assert_eq!(params["arguments"]["currency"], "USD");
    }

    #[tokio::test]
    async fn test_read_resource_sends_uri() {
        let transport = StubTransport::new(vec![
            Ok(init_payload()),
            Ok(serde_json::json!({"contents": [{"text": "hi"}]})),
        ]);
        let session = Session::handshake(transport.clone()).await.unwrap();

        let result = session.read_resource("resource://accounts").await.unwrap();
        assert_eq!(result.contents.len(), 1);

        let requests = transport.recorded_requests();
        let (method, params) = &requests[1];
        assert_eq!(method, "resources/read");
        assert_eq!(params.as_ref().unwrap()["uri"], "resource://accounts");
    }

    #[tokio::test]
    async fn test_close_notifies_but_leaves_transport_open() {
        let transport = StubTransport::new(vec![Ok(init_payload())]);
        let session = Session::handshake(transport.clone()).await.unwrap();

        session.close().await.unwrap();
        assert!(transport
            .notifications
            .lock()
            .unwrap()
            .contains(&"shutdown".to_string()));
        assert_eq!(transport.close_calls.load(Ordering::SeqCst), 0);
    }
}
