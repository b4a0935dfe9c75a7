//! Connection lifecycle — paired acquisition and release of transport
//! and session.
//!
//! Acquisition order is transport first, then session (handshake); any
//! failure after the transport exists releases it before the error
//! propagates, so no half-open connection outlives a failed connect.
//! Release runs in the reverse order, session then transport, with each
//! step independently guarded: teardown always reaches "not connected".

use std::sync::Arc;

use super::errors::ClientError;
use super::session::Session;
use super::transport::{Transport, TransportProvider};

/// Acquire a transport for `endpoint` and run the handshake over it.
///
/// On handshake failure the transport is closed before the error is
/// surfaced; the returned error is always `ConnectionFailed` carrying
/// the underlying cause.
pub async fn open_connection(
    provider: &dyn TransportProvider,
    endpoint: &str,
) -> Result<(Arc<dyn Transport>, Session), ClientError> {
    let transport = provider.open(endpoint).await.map_err(|e| match e {
        err @ ClientError::ConnectionFailed { .. } => err,
        other => ClientError::ConnectionFailed {
            endpoint: endpoint.to_string(),
            reason: other.to_string(),
        },
    })?;

    match Session::handshake(transport.clone()).await {
        Ok(session) => Ok((transport, session)),
        Err(e) => {
            if let Err(close_err) = transport.close().await {
                tracing::warn!(
                    endpoint = %endpoint,
                    error = %close_err,
                    "failed to release transport after handshake failure"
                );
            }
            Err(ClientError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Release a session/transport pair, session first.
///
/// Each step is independently guarded; failures are demoted to warnings
/// because teardown must always complete.
pub async fn close_connection(session: Session, transport: Arc<dyn Transport>) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "error closing session");
    }

    if let Err(e) = transport.close().await {
        tracing::warn!(error = %e, "error closing transport");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
