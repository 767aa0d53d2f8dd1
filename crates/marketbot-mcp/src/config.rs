//! Server configuration.
//!
//! Values come from command-line flags or their environment variables
//! first, then an optional TOML file, then built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marketbot_eia::REGISTRATION_URL;

/// Default bind address for the HTTP transport.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 5222;

/// Default seed for Monte Carlo simulations.
pub const DEFAULT_SIMULATION_SEED: u64 = 42;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// HTTP transport selected without a server secret.
    #[error(
        "SERVER_SECRET is required for streamable-http transport. \
         Set it via --server-secret flag or SERVER_SECRET environment variable."
    )]
    MissingServerSecret,
}

/// How the server talks to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Streamable HTTP on `host:port`, bearer-token protected
    #[default]
    StreamableHttp,
    /// Standard input and output
    Stdio,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::StreamableHttp => f.write_str("streamable-http"),
            Transport::Stdio => f.write_str("stdio"),
        }
    }
}

/// Command-line arguments. Each flag can also be set from the named
/// environment variable.
#[derive(Parser, Debug, Default)]
#[command(name = "marketbot-mcp-server")]
#[command(author, version, about = "Market Analysis Bot - MCP server for energy trading", long_about = None)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "MARKETBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transport protocol [default: streamable-http]
    #[arg(long, value_enum, env = "TRANSPORT")]
    pub transport: Option<Transport>,

    /// Host to bind (streamable-http only) [default: 127.0.0.1]
    #[arg(long, env = "SERVER_HOST")]
    pub host: Option<String>,

    /// Port to listen on (streamable-http only) [default: 5222]
    #[arg(short, long, env = "SERVER_PORT")]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long, env = "DEBUG")]
    pub debug: bool,

    /// Secret clients must present in their bearer token
    #[arg(long, env = "SERVER_SECRET", hide_env_values = true)]
    pub server_secret: Option<String>,

    /// EIA Open Data API key
    #[arg(long, env = "EIA_API_KEY", hide_env_values = true)]
    pub eia_api_key: Option<String>,

    /// Seed for Monte Carlo simulations [default: 42]
    #[arg(long, env = "SIMULATION_SEED")]
    pub simulation_seed: Option<u64>,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Transport protocol
    pub transport: Option<Transport>,
    /// Bind host
    pub host: Option<String>,
    /// Listen port
    pub port: Option<u16>,
    /// Debug logging
    pub debug: Option<bool>,
    /// Bearer-token secret
    pub server_secret: Option<String>,
    /// EIA API key
    pub eia_api_key: Option<String>,
    /// Monte Carlo seed
    pub simulation_seed: Option<u64>,
    /// Log file path
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Resolved server configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Transport protocol
    pub transport: Transport,
    /// Bind host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Debug logging
    pub debug: bool,
    /// Bearer-token secret
    pub server_secret: Option<String>,
    /// EIA API key
    pub eia_api_key: Option<String>,
    /// Monte Carlo seed
    pub simulation_seed: u64,
    /// Log file path
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            server_secret: None,
            eia_api_key: None,
            simulation_seed: DEFAULT_SIMULATION_SEED,
            log_file: None,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServerConfig")
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("server_secret", &redact(&self.server_secret))
            .field("eia_api_key", &redact(&self.eia_api_key))
            .field("simulation_seed", &self.simulation_seed)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ServerConfig {
    /// Resolves arguments, reading the config file they name.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(args, file))
    }

    /// Combines arguments and file values; arguments win.
    pub fn merge(args: Args, file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            transport: args
                .transport
                .or(file.transport)
                .unwrap_or(defaults.transport),
            host: args.host.or(file.host).unwrap_or(defaults.host),
            port: args.port.or(file.port).unwrap_or(defaults.port),
            debug: args.debug || file.debug.unwrap_or(defaults.debug),
            server_secret: non_empty(args.server_secret).or(non_empty(file.server_secret)),
            eia_api_key: non_empty(args.eia_api_key).or(non_empty(file.eia_api_key)),
            simulation_seed: args
                .simulation_seed
                .or(file.simulation_seed)
                .unwrap_or(defaults.simulation_seed),
            log_file: args.log_file.or(file.log_file),
        }
    }

    /// Fails if the HTTP transport has no secret. A missing EIA key only
    /// disables the data tool, so it is logged rather than rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport == Transport::StreamableHttp && self.server_secret.is_none() {
            return Err(ConfigError::MissingServerSecret);
        }
        if self.eia_api_key.is_none() {
            tracing::warn!(
                "EIA_API_KEY not set. EIA data tool will not function. Register at {REGISTRATION_URL}"
            );
        }
        Ok(())
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
