//! Streamable HTTP transport.
//!
//! `/mcp` serves the MCP protocol behind the bearer-token middleware;
//! `/health` is open.

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{require_bearer, AuthState};
use crate::server::MarketAnalysisServer;

/// Builds the HTTP router. Each MCP session gets a clone of `server`.
pub fn router(server: MarketAnalysisServer, server_secret: &str) -> Router {
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let protected = Router::new()
        .nest_service("/mcp", mcp_service)
        .layer(from_fn_with_state(
            AuthState::new(server_secret),
            require_bearer,
        ));

    // Configure CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves `router` on `addr` until Ctrl-C.
pub async fn serve(router: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Market Analysis Assistant listening on http://{}/mcp", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
