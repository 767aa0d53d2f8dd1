//! Bearer-token authentication.
//!
//! A bearer token is the standard Base64 encoding of a JSON object:
//!
//! ```json
//! {
//!   "server_secret": "demo-secret-key",
//!   "user_id_token": "<HS256 JWT with an email claim>",
//!   "connector_access_tokens": { "google": "..." }
//! }
//! ```
//!
//! The server secret gates access. The optional identity token names the
//! caller; its claims are read but its signature is not checked here, since
//! the server secret is the trust boundary.

use std::collections::BTreeMap;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Server secret used by the token generator when none is given.
pub const DEMO_SERVER_SECRET: &str = "demo-secret-key";

/// Key used to sign demo identity tokens.
pub const DEMO_SIGNING_SECRET: &str = "test-secret";

/// Fixed `iat` claim of demo identity tokens.
pub const DEMO_ISSUED_AT: i64 = 1_234_567_890;

/// A specialized Result type for authentication.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token is not Base64-encoded JSON of the expected shape.
    #[error("malformed bearer token: {0}")]
    MalformedToken(String),

    /// The token's server secret does not match.
    #[error("invalid server secret")]
    InvalidSecret,

    /// The identity token is not a well-formed JWT.
    #[error("malformed user id token: {0}")]
    MalformedIdToken(String),

    /// The identity token signature does not verify.
    #[error("user id token signature mismatch")]
    BadSignature,

    /// HMAC key setup failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Caller identity attached to an authenticated request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Email from the identity token
    pub email: String,
    /// OAuth tokens for third-party services, by connector name
    pub connector_access_tokens: BTreeMap<String, String>,
}

impl AuthenticatedUser {
    /// A user without connectors.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            connector_access_tokens: BTreeMap::new(),
        }
    }

    /// Replaces the connector tokens.
    pub fn with_connectors(mut self, tokens: BTreeMap<String, String>) -> Self {
        self.connector_access_tokens = tokens;
        self
    }

    /// True if a token for `connector` is present.
    pub fn has_connector(&self, connector: &str) -> bool {
        self.connector_access_tokens.contains_key(connector)
    }

    /// Token for `connector`, if present.
    pub fn connector_token(&self, connector: &str) -> Option<&str> {
        self.connector_access_tokens
            .get(connector)
            .map(String::as_str)
    }

    /// Connector names in sorted order.
    pub fn connector_names(&self) -> impl Iterator<Item = &str> {
        self.connector_access_tokens.keys().map(String::as_str)
    }
}

/// Decoded bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerPayload {
    /// Must equal the server's configured secret
    pub server_secret: String,
    /// Optional HS256 JWT naming the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id_token: Option<String>,
    /// Optional OAuth tokens for third-party services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_access_tokens: Option<BTreeMap<String, String>>,
}

impl BearerPayload {
    /// A payload carrying only the server secret.
    pub fn new(server_secret: impl Into<String>) -> Self {
        Self {
            server_secret: server_secret.into(),
            user_id_token: None,
            connector_access_tokens: None,
        }
    }

    /// Adds an identity token.
    pub fn with_user_id_token(mut self, token: impl Into<String>) -> Self {
        self.user_id_token = Some(token.into());
        self
    }

    /// Adds connector tokens.
    pub fn with_connectors(mut self, tokens: BTreeMap<String, String>) -> Self {
        self.connector_access_tokens = Some(tokens);
        self
    }

    /// Base64 of the JSON encoding.
    pub fn encode(&self) -> String {
        // A struct of strings always serializes.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    /// Parses a token produced by [`encode`](Self::encode).
    pub fn decode(token: &str) -> AuthResult<Self> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedToken(e.to_string()))
    }
}

/// Claims carried by an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdClaims {
    /// Caller email
    pub email: String,
    /// Subject, same as the email for demo tokens
    #[serde(default)]
    pub sub: String,
    /// Issued-at, seconds since the epoch
    #[serde(default)]
    pub iat: i64,
}

impl UserIdClaims {
    /// Demo claims for `email`.
    pub fn for_email(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            sub: email.clone(),
            email,
            iat: DEMO_ISSUED_AT,
        }
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
}

fn sign(secret: &str, input: &str) -> AuthResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(input.as_bytes());
    Ok(mac)
}

fn encode_segment<T: Serialize>(value: &T) -> AuthResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Signs `claims` as an HS256 JWT.
pub fn encode_user_id_token(claims: &UserIdClaims, secret: &str) -> AuthResult<String> {
    let header = encode_segment(&JwtHeader {
        alg: "HS256",
        typ: "JWT",
    })?;
    let payload = encode_segment(claims)?;
    let signing_input = format!("{header}.{payload}");

    let signature = sign(secret, &signing_input)?.finalize().into_bytes();
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Demo identity token for `email`, signed with [`DEMO_SIGNING_SECRET`].
pub fn create_user_id_token(email: &str) -> AuthResult<String> {
    encode_user_id_token(&UserIdClaims::for_email(email), DEMO_SIGNING_SECRET)
}

fn split_jwt(token: &str) -> AuthResult<(&str, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(AuthError::MalformedIdToken(
            "expected three dot-separated segments".to_string(),
        )),
    }
}

/// Reads the claims of a JWT without checking its signature.
pub fn decode_user_id_token(token: &str) -> AuthResult<UserIdClaims> {
    let (_, payload, _) = split_jwt(token)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::MalformedIdToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedIdToken(e.to_string()))
}

/// Reads the claims of an HS256 JWT after verifying its signature.
pub fn verify_user_id_token(token: &str, secret: &str) -> AuthResult<UserIdClaims> {
    let (header, payload, signature) = split_jwt(token)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| AuthError::MalformedIdToken(e.to_string()))?;

    sign(secret, &format!("{header}.{payload}"))?
        .verify_slice(&signature)
        .map_err(|_| AuthError::BadSignature)?;

    decode_user_id_token(token)
}

/// Checks an `Authorization` header value against the server secret.
///
/// Returns the caller identity when the token carries one, `None` when it
/// only carries the secret.
pub fn authenticate(
    authorization: Option<&str>,
    server_secret: &str,
) -> AuthResult<Option<AuthenticatedUser>> {
    let header = authorization.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AuthError::MissingToken)?;

    let payload = BearerPayload::decode(token)?;
    if payload.server_secret != server_secret {
        return Err(AuthError::InvalidSecret);
    }

    let Some(id_token) = payload.user_id_token.as_deref() else {
        return Ok(None);
    };
    let claims = decode_user_id_token(id_token)?;

    Ok(Some(
        AuthenticatedUser::new(claims.email)
            .with_connectors(payload.connector_access_tokens.unwrap_or_default()),
    ))
}

/// Axum middleware enforcing the bearer token.
#[cfg(feature = "http")]
pub mod middleware {
    use std::sync::Arc;

    use axum::extract::{Request, State};
    use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
    use axum::http::StatusCode;
    use axum::middleware::Next;
    use axum::response::{IntoResponse, Response};

    use super::authenticate;

    /// Shared state for [`require_bearer`].
    #[derive(Clone)]
    pub struct AuthState {
        server_secret: Arc<str>,
    }

    impl AuthState {
        /// State checking tokens against `server_secret`.
        pub fn new(server_secret: impl Into<Arc<str>>) -> Self {
            Self {
                server_secret: server_secret.into(),
            }
        }
    }

    /// Rejects requests without a valid bearer token with 401 and stores the
    /// caller's [`AuthenticatedUser`](super::AuthenticatedUser) in the
    /// request extensions.
    pub async fn require_bearer(
        State(state): State<AuthState>,
        mut request: Request,
        next: Next,
    ) -> Response {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match authenticate(header, &state.server_secret) {
            Ok(user) => {
                if let Some(user) = user {
                    tracing::debug!(email = %user.email, "authenticated request");
                    request.extensions_mut().insert(user);
                }
                next.run(request).await
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejected unauthenticated request");
                (
                    StatusCode::UNAUTHORIZED,
                    [(WWW_AUTHENTICATE, "Bearer")],
                    err.to_string(),
                )
                    .into_response()
            }
        }
    }
}
