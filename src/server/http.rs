//! Streamable HTTP transport
//!
//! Each POST carries one JSON-RPC message and gets its response as the body.
//! Notifications are acknowledged with `202 Accepted` and no body.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
};
use tokio::net::TcpListener;

use super::handlers::handle_line;
use super::server::MAX_LINE_LENGTH;
use crate::core::PackageService;

/// Routes for the tool endpoint, served at `/` and `/mcp`
pub fn router(service: PackageService) -> Router {
    Router::new()
        .route("/", post(rpc))
        .route("/mcp", post(rpc))
        .layer(DefaultBodyLimit::max(MAX_LINE_LENGTH))
        .with_state(service)
}

/// Bind the HTTP listener, e.g. `127.0.0.1:8080`
pub async fn bind_http(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    tracing::info!("MCP handler listening at http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve HTTP requests until Ctrl-C
pub async fn run_http(listener: TcpListener, service: PackageService) -> Result<()> {
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn rpc(State(service): State<PackageService>, body: String) -> axum::response::Response {
    match handle_line(&service, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
