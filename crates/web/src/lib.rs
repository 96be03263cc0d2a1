//! Keep-alive HTTP responder.
//!
//! Its only job is to answer an external process supervisor: `GET /` returns
//! a fixed liveness string and `GET /health` a small JSON status. Nothing
//! here is part of the room logic.

use {
    axum::{Json, Router, extract::State, response::IntoResponse, routing::get},
    tokio_util::sync::CancellationToken,
    tracing::info,
};

use tempvox_registry::SharedRegistry;

/// Shared state for the responder.
#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
}

impl AppState {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

/// Build the responder router (shared between startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind and serve until the token is cancelled.
pub async fn serve(
    bind: &str,
    port: u16,
    state: AppState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "keep-alive responder listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root_handler() -> &'static str {
    "I'm alive!"
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = {
        let registry = state.registry.read().unwrap_or_else(|e| e.into_inner());
        registry.len()
    };
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": rooms,
    }))
}
