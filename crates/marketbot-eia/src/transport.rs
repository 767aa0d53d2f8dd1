//! HTTP transport abstraction.
//!
//! The client talks to the network through [`HttpTransport`] so tests can
//! substitute a scripted transport for the production `reqwest` one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Outgoing GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, in order; keys may repeat
    pub query: Vec<(String, String)>,
    /// Total request timeout
    pub timeout: Duration,
}

/// Response status and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A response with an arbitrary status.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("{0}")]
    Failed(String),
}

/// Executes GET requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns whatever response arrived, regardless of status.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).get(request).await
    }
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marketbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Failed(format!("connection failed: {err}"))
    } else {
        TransportError::Failed(format!("request failed: {err}"))
    }
}
