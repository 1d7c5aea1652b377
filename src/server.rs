//! HTTP relay server.
//!
//! Exposes the completion relay to browser clients as a single JSON
//! endpoint. The typed reveal is a client-side concern; the server only
//! forwards the query and returns the full answer text.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/search` | Relay a query to the completion service |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors are returned as `{ "error": "<message>" }`:
//!
//! - `400` — missing or empty `query` field (`"Missing query"`)
//! - `500` — upstream completion failure (`"Something went wrong"`)
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the endpoint can be
//! called directly from browser frontends.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::relay::{create_relay, CompletionRelay};

/// Shared state passed to route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    relay: Arc<dyn CompletionRelay>,
}

/// Starts the relay server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let relay: Arc<dyn CompletionRelay> = Arc::from(create_relay(&config.completion)?);
    let bind_addr = config.server.bind.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        relay: relay.clone(),
    };

    let app = Router::new()
        .route("/api/search", post(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!(
        "askbar relay listening on http://{} (model: {})",
        bind_addr,
        relay.model_name()
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// Error that converts into an HTTP response with an `{ "error": ... }` body.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn missing_query() -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        message: "Missing query".to_string(),
    }
}

fn upstream_failure() -> ApiError {
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Something went wrong".to_string(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/search ============

/// Handler for `POST /api/search`.
///
/// Accepts `{ "query": string }` and returns `{ "result": string }`.
/// The body is taken as loose JSON so a missing `query` field yields the
/// documented 400 body instead of an extractor rejection.
async fn handle_search(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = body
        .get("query")
        .and_then(|q| q.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(missing_query)?;

    let result = state.relay.complete(query).await.map_err(|e| {
        eprintln!("relay error: {}", e);
        upstream_failure()
    })?;

    Ok(Json(serde_json::json!({ "result": result })))
}
