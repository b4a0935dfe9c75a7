//! MCP client — high-level interface for one server connection.
//!
//! Owns the connection state machine and the four protocol operations.
//! Connection failures propagate from `connect`; once connected, the
//! operations never fail past the caller — protocol and transport errors
//! are converted into each operation's documented soft-failure value.

use std::sync::Arc;

use super::content;
use super::errors::ClientError;
use super::lifecycle;
use super::result;
use super::session::Session;
use super::transport::{StreamableHttpProvider, Transport, TransportProvider};
use super::types::{ResourceDescriptor, ToolDescriptor, ToolResult};

// ─── Connection State ────────────────────────────────────────────────────────

/// Where the client is in its connection lifecycle.
///
/// `Connecting` exists only inside `connect`; it exits to `Connected` on
/// success or back to `Disconnected` via forced cleanup on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// The live transport/session pair. At most one exists per client.
struct ConnectionHandle {
    transport: Arc<dyn Transport>,
    session: Session,
}

// ─── McpClient ───────────────────────────────────────────────────────────────

/// Client for one MCP server endpoint.
pub struct McpClient {
    /// The server endpoint URL. Immutable for the client's lifetime.
    endpoint: String,
    /// Source of transports; swapped for a stub in tests.
    provider: Box<dyn TransportProvider>,
    /// The active connection, if any.
    connection: Option<ConnectionHandle>,
    state: ConnectionState,
}

impl McpClient {
    /// Create a client for `endpoint` using the streamable HTTP transport.
    pub fn new(endpoint: &str) -> Self {
        Self::with_provider(endpoint, Box::new(StreamableHttpProvider))
    }

    /// Create a client with a custom transport provider.
    pub fn with_provider(endpoint: &str, provider: Box<dyn TransportProvider>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            provider,
            connection: None,
            state: ConnectionState::Disconnected,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Establish the connection: acquire a transport, run the handshake.
    ///
    /// Fails fast with `AlreadyConnected` if a connection is active — an
    /// active session is never silently dropped. On any failure the
    /// client is back in `Disconnected` with nothing leaked.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.connection.is_some() {
            return Err(ClientError::AlreadyConnected {
                endpoint: self.endpoint.clone(),
            });
        }

        tracing::info!(endpoint = %self.endpoint, "connecting");
        self.state = ConnectionState::Connecting;

        match lifecycle::open_connection(self.provider.as_ref(), &self.endpoint).await {
            Ok((transport, session)) => {
                self.connection = Some(ConnectionHandle { transport, session });
                self.state = ConnectionState::Connected;
                tracing::info!(endpoint = %self.endpoint, "connected");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Tear down the connection. Idempotent; never fails.
    ///
    /// Session is released before transport; release warnings are logged
    /// by the lifecycle layer. Handles are cleared unconditionally.
    pub async fn disconnect(&mut self) {
        if let Some(handle) = self.connection.take() {
            lifecycle::close_connection(handle.session, handle.transport).await;
            tracing::info!(endpoint = %self.endpoint, "disconnected");
        }
        self.state = ConnectionState::Disconnected;
    }

    // ─── Protocol Operations ─────────────────────────────────────────────

    /// List the server's tools, in server-reported order.
    ///
    /// Soft-fails: a listing error is logged and yields an empty vector,
    /// so one failed listing never aborts the caller's flow. An empty
    /// result is therefore ambiguous between "no tools" and "failed".
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ClientError> {
        let session = self.session()?;

        match session.list_tools().await {
            Ok(tools) => Ok(tools),
            Err(e) => {
                tracing::error!(error = %e, "error listing tools");
                Ok(Vec::new())
            }
        }
    }

    /// List the server's resources, in server-reported order.
    ///
    /// Same soft-failure contract as [`list_tools`](Self::list_tools).
    pub async fn list_resources(&mut self) -> Result<Vec<ResourceDescriptor>, ClientError> {
        let session = self.session()?;

        match session.list_resources().await {
            Ok(resources) => Ok(resources),
            Err(e) => {
                tracing::error!(error = %e, "error listing resources");
                Ok(Vec::new())
            }
        }
    }

    /// Invoke a tool. `arguments` defaults to an empty mapping.
    ///
    /// All failures after connection are encoded in the returned
    /// [`ToolResult`]; only `NotConnected` is returned as an error.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<ToolResult, ClientError> {
        let session = self.session()?;
        let arguments = arguments.unwrap_or_else(|| serde_json::json!({}));

        tracing::info!(tool = %name, "calling tool");

        match session.call_tool(name, arguments).await {
            Ok(raw) => Ok(result::interpret(raw)),
            Err(e) => {
                tracing::error!(tool = %name, error = %e, "tool call failed");
                Ok(ToolResult::Error(e.to_string()))
            }
        }
    }

    /// Read a resource and return its decoded text form.
    ///
    /// Only the first content entry is consulted; its raw text/blob
    /// representation is returned as-is (only `call_tool` parses JSON).
    /// Failure, or a response with no content, yields an empty string.
    pub async fn read_resource(&mut self, uri: &str) -> Result<String, ClientError> {
        let session = self.session()?;

        tracing::info!(uri = %uri, "reading resource");

        match session.read_resource(uri).await {
            Ok(raw) => {
                let Some(first) = raw.contents.first() else {
                    return Ok(String::new());
                };
                let decoded = content::decode(first);
                tracing::debug!(mime_type = %decoded.mime_type, "resource content decoded");
                Ok(decoded.text)
            }
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "resource read failed");
                Ok(String::new())
            }
        }
    }

    // ─── Status ──────────────────────────────────────────────────────────

    /// The server endpoint this client targets.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a connection is currently active.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The active session, or `NotConnected`.
    fn session(&self) -> Result<&Session, ClientError> {
        self.connection
            .as_ref()
            .map(|handle| &handle.session)
            .ok_or(ClientError::NotConnected)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
