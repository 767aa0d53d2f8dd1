//! Bearer authentication at the HTTP boundary.

#![cfg(feature = "http")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use marketbot_mcp::auth::{create_user_id_token, BearerPayload};
use marketbot_mcp::http_server;
use marketbot_mcp::server::MarketAnalysisServer;

const SECRET: &str = "integration-secret";

fn app() -> axum::Router {
    http_server::router(MarketAnalysisServer::new(None, 42), SECRET)
}

fn initialize_request(token: Option<&str>) -> Request<Body> {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "http-auth-test", "version": "0.0.0"}
        }
    });

    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_is_open() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_mcp_requires_token() {
    let response = app().oneshot(initialize_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_mcp_rejects_wrong_secret() {
    let token = BearerPayload::new("not-the-secret").encode();
    let response = app()
        .oneshot(initialize_request(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mcp_rejects_garbage_token() {
    let response = app()
        .oneshot(initialize_request(Some("!!not-base64!!")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mcp_accepts_valid_token() {
    let token = BearerPayload::new(SECRET)
        .with_user_id_token(create_user_id_token("trader@company.com").unwrap())
        .encode();
    let response = app()
        .oneshot(initialize_request(Some(&token)))
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
