//! Command-line entry point.
//!
//! One run is one connect → operate → disconnect sequence against a
//! single MCP server. Results go to stdout as pretty JSON; logs go to
//! stderr.

use anyhow::{Context, Result};
use clap::Parser;

use unimcp::client::{McpClient, ToolResult};

/// Universal MCP client for streamable-HTTP servers.
#[derive(Debug, Parser)]
#[command(name = "unimcp", version, about)]
struct Cli {
    /// MCP server endpoint URL (e.g. http://localhost:8080/mcp/stream)
    #[arg(env = "MCP_SERVER_URL")]
    url: String,

    /// Invoke this tool
    #[arg(long)]
    tool: Option<String>,

    /// Tool arguments as a JSON object
    #[arg(long, requires = "tool", value_name = "JSON")]
    args: Option<String>,

    /// List the server's tools
    #[arg(long)]
    list_tools: bool,

    /// List the server's resources
    #[arg(long)]
    list_resources: bool,

    /// Read a resource by URI
    #[arg(long, value_name = "URI")]
    read: Option<String>,
}

#[tokio::main]
async fn main() {
    unimcp::init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut client = McpClient::new(&cli.url);
    client
        .connect()
        .await
        .with_context(|| format!("could not connect to {}", cli.url))?;

    // An interrupt mid-operation must still reach disconnect, so the
    // operations run under select and teardown runs unconditionally.
    let outcome = tokio::select! {
        result = execute(&mut client, &cli) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted");
            Ok(())
        }
    };

    client.disconnect().await;
    outcome
}

/// Run the requested operations on a connected client.
async fn execute(client: &mut McpClient, cli: &Cli) -> Result<()> {
    let mut ran_any = false;

    if cli.list_tools {
        ran_any = true;
        print_tools(client).await?;
    }

    if cli.list_resources {
        ran_any = true;
        let resources = client.list_resources().await?;
        println!("Available resources ({}):", resources.len());
        for resource in &resources {
            println!("  {} — {}", resource.uri, resource.description);
        }
    }

    if let Some(ref uri) = cli.read {
        ran_any = true;
        let text = client.read_resource(uri).await?;
        // Pretty-print when the resource text happens to be JSON.
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{text}"),
        }
    }

    if let Some(ref tool) = cli.tool {
        ran_any = true;
        let arguments = cli
            .args
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("--args must be a JSON object")?;

        let result = client.call_tool(tool, arguments).await?;
        if let ToolResult::LoginRequired { ref login_url } = result {
            eprintln!("Please log in again: {login_url}");
        }
        println!("{}", serde_json::to_string_pretty(&result.into_value())?);
    }

    // Bare URL: show what the server offers.
    if !ran_any {
        print_tools(client).await?;
    }

    Ok(())
}

async fn print_tools(client: &mut McpClient) -> Result<()> {
    let tools = client.list_tools().await?;
    println!("Available tools ({}):", tools.len());
    for tool in &tools {
        println!("  {} — {}", tool.name, tool.description);
    }
    Ok(())
}
