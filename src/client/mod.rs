//! MCP client — session lifecycle and protocol interaction over
//! streamable HTTP.
//!
//! This module handles:
//! - Acquiring and releasing the transport/session pair as one resource
//! - The `initialize` handshake and the four protocol operations
//!   (list tools, list resources, call tool, read resource)
//! - Decoding heterogeneous content payloads into a uniform result shape
//! - Disambiguating tool-call outcomes (payload, success marker,
//!   login-required signal, error)

pub mod client;
pub mod content;
pub mod errors;
pub mod lifecycle;
pub mod result;
pub mod session;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{ConnectionState, McpClient};
pub use errors::ClientError;
pub use transport::{StreamableHttpProvider, Transport, TransportProvider};
pub use types::{ContentItem, ResourceDescriptor, ToolDescriptor, ToolResult};
