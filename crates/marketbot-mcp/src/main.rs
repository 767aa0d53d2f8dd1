//! Market Analysis Bot - Energy trading analysis via Model Context Protocol
//!
//! # Usage
//!
//! ## stdio transport (for Claude Desktop, local use)
//! ```bash
//! marketbot-mcp-server --transport stdio
//! ```
//!
//! ## Streamable HTTP transport (default, for remote hosting)
//! ```bash
//! marketbot-mcp-server --server-secret demo-secret-key --port 5222
//! ```
//!
//! Every flag can also be set through its environment variable, a `.env`
//! file in the working directory, or a TOML file passed with `--config`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use marketbot_mcp::config::{Args, ServerConfig, Transport};
use marketbot_mcp::server::MarketAnalysisServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = ServerConfig::load(args)?;

    init_logging(&config)?;

    tracing::info!("Market Analysis Bot - MCP Server");
    tracing::info!(transport = %config.transport, debug = config.debug, "starting");
    if config.transport == Transport::StreamableHttp {
        tracing::info!(host = %config.host, port = config.port, "HTTP listener");
    }

    config.validate()?;

    let server = MarketAnalysisServer::from_config(&config);

    match config.transport {
        Transport::Stdio => run_stdio_server(server).await,
        Transport::StreamableHttp => run_http_server(server, &config).await,
    }
}

/// Console logs go to stderr for stdio so the protocol stream stays clean.
fn init_logging(config: &ServerConfig) -> anyhow::Result<()> {
    let directives = if config.debug {
        "marketbot_mcp=debug,marketbot_eia=debug,marketbot_analytics=debug,rmcp=debug"
    } else {
        "marketbot_mcp=info,marketbot_eia=info,marketbot_analytics=info,rmcp=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let console_writer = match config.transport {
        Transport::Stdio => BoxMakeWriter::new(std::io::stderr),
        Transport::StreamableHttp => BoxMakeWriter::new(std::io::stdout),
    };
    let console = tracing_subscriber::fmt::layer()
        .with_writer(console_writer)
        .with_target(config.debug)
        .with_file(config.debug)
        .with_line_number(config.debug);

    let file = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    if let Some(path) = &config.log_file {
        tracing::info!("Logging to file: {}", path.display());
    }
    Ok(())
}

/// Run the server with stdio transport (for Claude Desktop)
#[cfg(feature = "stdio")]
async fn run_stdio_server(server: MarketAnalysisServer) -> anyhow::Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    tracing::info!("Using stdio transport");
    let tools = server.tool_names();

    let service = server.serve(stdio()).await?;

    tracing::info!("Market Analysis Assistant ready");
    tracing::info!("Available tools: {}", tools.join(", "));

    service.waiting().await?;

    Ok(())
}

/// Fallback when the stdio feature is not enabled
#[cfg(not(feature = "stdio"))]
async fn run_stdio_server(_server: MarketAnalysisServer) -> anyhow::Result<()> {
    anyhow::bail!("stdio transport not available. Rebuild with: cargo build --features stdio")
}

/// Run the server with streamable HTTP transport (for remote hosting)
#[cfg(feature = "http")]
async fn run_http_server(server: MarketAnalysisServer, config: &ServerConfig) -> anyhow::Result<()> {
    use marketbot_mcp::http_server;

    let secret = config
        .server_secret
        .as_deref()
        .context("SERVER_SECRET is required for streamable-http transport")?;

    tracing::info!("Using streamable HTTP transport on {}", config.bind_address());
    tracing::info!("Available tools: {}", server.tool_names().join(", "));

    let router = http_server::router(server, secret);
    http_server::serve(router, &config.bind_address()).await
}

/// Fallback when the HTTP feature is not enabled
#[cfg(not(feature = "http"))]
async fn run_http_server(_server: MarketAnalysisServer, _config: &ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!("HTTP transport not available. Rebuild with: cargo build --features http")
}
