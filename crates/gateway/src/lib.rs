//! Liveness responder for hosting platforms that probe an HTTP port.
//!
//! Shares no state with the bot; if it fails the bot keeps running.

use std::net::SocketAddr;

use {
    axum::{Router, http::StatusCode, response::IntoResponse, routing::get},
    tracing::info,
};

pub const BOOT_TEXT: &str = "Booted Orion!";

/// Build the liveness router (shared between production startup and tests).
pub fn build_app() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Bind `addr` and serve the liveness routes until the listener fails.
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "liveness endpoint listening");
    axum::serve(listener, build_app()).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    BOOT_TEXT
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
