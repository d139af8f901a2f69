//! Keep-alive HTTP listener
//!
//! Hosting platforms probe the bound port to decide the process is alive.
//! `/` answers with plain text, `/healthz` with a small JSON status.

use crate::llm::ModelResolver;
use crate::session::SessionStore;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

const BANNER: &str = "Vichar bot is running";

#[derive(Clone)]
pub struct HealthState {
    pub resolver: Arc<ModelResolver>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    /// Resolved model, if resolution has happened yet
    model: Option<String>,
    active_sessions: usize,
}

pub fn create_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

async fn healthz(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state
            .resolver
            .peek()
            .await
            .map(|handle| handle.identifier.clone()),
        active_sessions: state.sessions.active_sessions().await,
    })
}

/// Serve until `cancel` fires
pub async fn serve(
    addr: SocketAddr,
    state: HealthState,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Keep-alive listener started");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
