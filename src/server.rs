//! HTTP server for the feedback service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness, always ok |
//! | `GET`  | `/healthz` | Checks the API key and the vector store directory |
//! | `POST` | `/api/ai/feedback` | Review a submission |
//! | `POST` | `/api/ai/add_webpage` | Ingest a webpage into the index |
//!
//! # Error Contract
//!
//! Feedback requests always answer `200` once the body parses; retrieval and
//! generation failures are reported inside the `feedback` text. Ingestion
//! errors use:
//!
//! ```json
//! { "error": { "code": "fetch_error", "message": "failed to fetch ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `fetch_error` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

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
use crate::error::Error;
use crate::models::{AddWebpageResponse, FeedbackResult, Submission, WebsiteSource};
use crate::service::FeedbackService;

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    service: FeedbackService,
}

/// Start the server on `config.server.bind` with the Gemini-backed service.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = FeedbackService::from_config(config).await?;
    let count = service.index().count().await?;
    tracing::info!(chunks = count, "vector store loaded");

    let bind_addr = config.server.bind.clone();
    let app = router(Arc::new(config.clone()), service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Feedback server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router. Split out so tests can serve it on an ephemeral port.
pub fn router(config: Arc<Config>, service: FeedbackService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/healthz", get(handle_healthz))
        .route("/api/ai/feedback", post(handle_feedback))
        .route("/api/ai/add_webpage", post(handle_add_webpage))
        .layer(cors)
        .with_state(AppState { config, service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        if err.is_fetch() {
            AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "fetch_error".to_string(),
                message: err.to_string(),
            }
        } else {
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal".to_string(),
                message: err.to_string(),
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    message: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "RAG Pipeline",
        message: "Service healthy",
    })
}

// ============ GET /healthz ============

async fn handle_healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    match readiness(&state.config) {
        Ok(()) => Json(serde_json::json!({
            "status": "ok",
            "checks": { "gemini_key": true, "vectorstore_dir": true }
        })),
        Err(details) => {
            tracing::warn!(%details, "readiness check failed");
            Json(serde_json::json!({ "status": "error", "details": details }))
        }
    }
}

/// API key present and vector store directory exists (created if missing).
fn readiness(config: &Config) -> Result<(), String> {
    if config.gemini_api_key.is_none() {
        return Err("Gemini API key missing".to_string());
    }
    std::fs::create_dir_all(&config.vectorstore.dir).map_err(|e| {
        format!(
            "vector store directory {} unavailable: {}",
            config.vectorstore.dir.display(),
            e
        )
    })
}

// ============ POST /api/ai/feedback ============

async fn handle_feedback(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Json<FeedbackResult> {
    Json(state.service.generate_feedback(&submission).await)
}

// ============ POST /api/ai/add_webpage ============

async fn handle_add_webpage(
    State(state): State<AppState>,
    Json(source): Json<WebsiteSource>,
) -> Result<Json<AddWebpageResponse>, AppError> {
    let url = source.url.trim();
    let language = source.language.trim();
    if url.is_empty() {
        return Err(bad_request("url must not be empty"));
    }
    if language.is_empty() {
        return Err(bad_request("language must not be empty"));
    }

    let response = state.service.add_webpage(url, language).await.map_err(|e| {
        tracing::error!(url, error = %e, "webpage ingestion failed");
        AppError::from(e)
    })?;

    Ok(Json(response))
}
