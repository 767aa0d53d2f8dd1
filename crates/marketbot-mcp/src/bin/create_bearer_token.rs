//! Bearer token generator for testing the HTTP transport with MCP Inspector.
//!
//! ```bash
//! create-bearer-token
//! create-bearer-token --email trader@company.com
//! create-bearer-token --with-connectors --output-file token.txt
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use marketbot_mcp::auth::{create_user_id_token, BearerPayload, DEMO_SERVER_SECRET};

/// Generate a bearer token for MCP Inspector testing
#[derive(Parser, Debug)]
#[command(name = "create-bearer-token")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server secret
    #[arg(long, default_value = DEMO_SERVER_SECRET)]
    server_secret: String,

    /// User email for identity
    #[arg(long)]
    email: Option<String>,

    /// Include sample connector tokens (google, slack)
    #[arg(long)]
    with_connectors: bool,

    /// Save token to this file as well as printing it
    #[arg(long)]
    output_file: Option<PathBuf>,
}

fn sample_connectors() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("google".to_string(), "sample-google-oauth-token".to_string()),
        ("slack".to_string(), "sample-slack-oauth-token".to_string()),
    ])
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut payload = BearerPayload::new(&args.server_secret);
    if let Some(email) = &args.email {
        payload = payload.with_user_id_token(create_user_id_token(email)?);
    }
    if args.with_connectors {
        payload = payload.with_connectors(sample_connectors());
    }
    let token = payload.encode();

    let rule = "=".repeat(70);
    println!("{rule}");
    println!("Bearer Token Generated Successfully");
    println!("{rule}");
    println!("\nServer Secret: {}", args.server_secret);
    if let Some(email) = &args.email {
        println!("User Email: {email}");
    }
    if let Some(connectors) = &payload.connector_access_tokens {
        let names: Vec<&str> = connectors.keys().map(String::as_str).collect();
        println!("Connectors: {}", names.join(", "));
    }
    println!("\n{rule}");
    println!("Bearer Token (use in MCP Inspector):");
    println!("{rule}");
    println!("{token}");
    println!("{rule}");

    if let Some(path) = &args.output_file {
        std::fs::write(path, &token)
            .with_context(|| format!("failed to save token to {}", path.display()))?;
        println!("\n✓ Token saved to: {}", path.display());
    }

    println!("\nUsage in MCP Inspector:");
    println!("1. Transport Type: Streamable HTTP");
    println!("2. URL: http://localhost:5222/mcp");
    println!("3. Authentication → Bearer token: [paste token above]");
    println!("4. Click 'Connect'");
    println!("\n{rule}");

    Ok(())
}
