pub mod client;

pub use client::{ClientError, McpClient, ToolResult};

/// Initialize the tracing subscriber — structured logs on stderr.
///
/// Honors `RUST_LOG`; defaults to info for this crate and warnings for
/// everything else. Stdout stays clean for result output.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("unimcp=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        "unimcp starting"
    );
}
