//! # Marketbot MCP Server
//!
//! Model Context Protocol (MCP) server for energy market analysis.
//!
//! This crate exposes EIA energy data, Monte Carlo price simulation,
//! descriptive statistics and an energy trading glossary as MCP tools,
//! usable from Claude Desktop, MCP Inspector and other MCP clients.
//!
//! ## Features
//!
//! - **EIA Data**: petroleum and natural gas prices, production, STEO forecasts
//! - **Analysis**: Monte Carlo simulation with confidence intervals, summary statistics
//! - **Glossary**: definitions and trading context for common energy terms
//! - **Multiple Transports**: stdio (local) and streamable HTTP (remote, bearer-token protected)
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with stdio transport (for Claude Desktop)
//! marketbot-mcp-server --transport stdio
//!
//! # Run with HTTP transport (for remote hosting)
//! SERVER_SECRET=demo-secret-key marketbot-mcp-server --port 5222
//!
//! # Generate a bearer token for MCP Inspector
//! create-bearer-token --email trader@company.com
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod glossary;
#[cfg(feature = "http")]
pub mod http_server;
pub mod render;
pub mod server;

pub use auth::AuthenticatedUser;
pub use config::{Args, ServerConfig, Transport};
pub use server::{MarketAnalysisServer, ToolContext};

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "marketbot-mcp";

/// Human-readable server title
pub const SERVER_TITLE: &str = "Market Analysis Assistant";

/// Server version (same as crate version)
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
