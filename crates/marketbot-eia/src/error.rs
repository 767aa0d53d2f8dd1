//! Error types for EIA API access.

use thiserror::Error;

/// Where to obtain a free EIA API key.
pub const REGISTRATION_URL: &str = "https://signups.eia.gov/api/signup/";

/// Interactive browser for API routes and series identifiers.
pub const BROWSER_URL: &str = "https://www.eia.gov/opendata/browser/";

/// A specialized Result type for EIA operations.
pub type EiaResult<T> = Result<T, EiaError>;

/// Errors that can occur while building or issuing an EIA query.
#[derive(Debug, Error)]
pub enum EiaError {
    /// Client setup is missing something it cannot run without.
    #[error("{0}")]
    Configuration(String),

    /// A caller-supplied parameter violates a precondition.
    #[error("{0}")]
    Validation(String),

    /// Upstream rejected the API key (401).
    #[error("Invalid EIA API key. Please check your API key or register at: {REGISTRATION_URL}")]
    Auth,

    /// Upstream quota exhausted (429).
    #[error(
        "EIA API rate limit exceeded (5,000 requests/hour). Please wait before making more requests."
    )]
    RateLimit,

    /// Upstream does not know the requested route (404).
    #[error("Invalid EIA API path: '{path}'. Check available paths at: {BROWSER_URL}")]
    NotFound {
        /// The route that was requested.
        path: String,
    },

    /// The request did not complete within the client timeout.
    #[error(
        "EIA API request timed out. Please try again or check your network connection."
    )]
    Timeout,

    /// Any other HTTP or network failure.
    #[error("EIA API request failed{}: {body}", describe_status(.status))]
    Transport {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Response body or transport error description.
        body: String,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("Malformed EIA API response: {0}")]
    Response(String),
}

impl EiaError {
    /// Missing API key, with a pointer to the registration page.
    pub fn missing_api_key() -> Self {
        Self::Configuration(format!(
            "EIA API key required. Register at: {REGISTRATION_URL}"
        ))
    }

    /// Returns true for errors raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimit => Some(429),
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}
