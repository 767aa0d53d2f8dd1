//! EIA Open Data API v2 client.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::error::{EiaError, EiaResult};
use crate::query::{build_params, validate_params, QuerySpec};
use crate::rate_limit::{RateStatus, RateTracker};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};

/// API root.
pub const BASE_URL: &str = "https://api.eia.gov/v2";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parsed JSON body of a successful query, with the rate status observed
/// when the query started.
///
/// Only top-level JSON validity is checked; the record layout is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    body: Value,
    rate: RateStatus,
}

impl QueryResult {
    /// Wraps a JSON document.
    pub fn new(body: Value, rate: RateStatus) -> Self {
        Self { body, rate }
    }

    /// Records under `response.data`, or an empty slice if absent.
    pub fn records(&self) -> &[Value] {
        self.body
            .pointer("/response/data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total row count reported by the API, if present.
    pub fn total(&self) -> Option<u64> {
        let total = self.body.pointer("/response/total")?;
        total
            .as_u64()
            .or_else(|| total.as_str().and_then(|s| s.parse().ok()))
    }

    /// Rate check made before the request was issued. Near the limit this is
    /// [`RateStatus::Approaching`]; the query still went through.
    pub fn rate_status(&self) -> RateStatus {
        self.rate
    }
}

/// Client for the EIA Open Data API.
///
/// Holds an API key and an advisory request counter. Safe to share across
/// tasks; the counter is internally locked.
pub struct EiaClient<T = ReqwestTransport> {
    api_key: String,
    base_url: String,
    timeout: Duration,
    transport: T,
    rate: RateTracker,
}

impl EiaClient<ReqwestTransport> {
    /// Creates a client using the default `reqwest` transport.
    ///
    /// Fails with [`EiaError::Configuration`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> EiaResult<Self> {
        Self::with_transport(api_key, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> EiaClient<T> {
    /// Creates a client with a custom transport.
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> EiaResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(EiaError::missing_api_key());
        }

        tracing::info!("EIA API client initialized");

        Ok(Self {
            api_key,
            base_url: BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            transport,
            rate: RateTracker::new(),
        })
    }

    /// Overrides the API root (used against local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the rate tracker.
    pub fn with_rate_tracker(mut self, rate: RateTracker) -> Self {
        self.rate = rate;
        self
    }

    /// The configured API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Requests counted in the current rate window.
    pub fn request_count(&self) -> u32 {
        self.rate.request_count()
    }

    /// Resets an expired rate window and warns near the limit. Never blocks.
    pub fn check_rate_limit(&self) -> RateStatus {
        self.rate.check()
    }

    /// Encodes `spec` into request parameters using this client's key.
    pub fn build_params(&self, spec: &QuerySpec) -> Vec<(String, String)> {
        build_params(&self.api_key, spec)
    }

    /// Data endpoint for a route.
    pub fn data_url(&self, path: &str) -> String {
        format!(
            "{}/{}/data/",
            self.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    /// Queries the API.
    ///
    /// Validation failures return before any network call and do not count
    /// against the quota. Every issued request counts, whether it succeeds or
    /// not. No retries are made.
    pub async fn query(&self, spec: &QuerySpec) -> EiaResult<QueryResult> {
        let rate = self.check_rate_limit();

        validate_params(&spec.path, spec.frequency.as_str(), spec.limit)?;

        let request = HttpRequest {
            url: self.data_url(&spec.path),
            query: self.build_params(spec),
            timeout: self.timeout,
        };

        tracing::debug!(
            path = %spec.path,
            frequency = %spec.frequency,
            params = request.query.len(),
            "EIA API request"
        );

        let outcome = self.transport.get(request).await;
        self.rate.record_attempt();

        let response = match outcome {
            Ok(response) => response,
            Err(TransportError::Timeout) => {
                tracing::error!(path = %spec.path, "EIA API timeout");
                return Err(EiaError::Timeout);
            }
            Err(TransportError::Failed(message)) => {
                tracing::error!(path = %spec.path, error = %message, "EIA API transport error");
                return Err(EiaError::Transport {
                    status: None,
                    body: message,
                });
            }
        };

        if !response.is_success() {
            tracing::error!(
                path = %spec.path,
                status = response.status,
                body = %response.body,
                "EIA API error"
            );
            return Err(map_status(response.status, response.body, &spec.path));
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| EiaError::Response(e.to_string()))?;
        let result = QueryResult::new(value, rate);

        tracing::debug!(records = result.records().len(), "EIA API response");

        Ok(result)
    }
}

impl<T> fmt::Debug for EiaClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EiaClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

fn map_status(status: u16, body: String, path: &str) -> EiaError {
    match status {
        401 => EiaError::Auth,
        404 => EiaError::NotFound {
            path: path.to_string(),
        },
        429 => EiaError::RateLimit,
        _ => EiaError::Transport {
            status: Some(status),
            body,
        },
    }
}
