//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{to_llm_history, ChatRequest, ErrorResponse, ModelsResponse};
use super::AppState;
use crate::orchestrator::{ChatEvent, PUBLIC_ERROR_MESSAGE};
use crate::tools::ToolContext;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Buffered client events per request before the orchestrator waits
const EVENT_BUFFER: usize = 256;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/api/models", get(list_models))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    let history = to_llm_history(request.messages).map_err(AppError::BadRequest)?;
    let ctx = ToolContext::new(
        state.store.clone(),
        state.config.tz,
        Utc::now(),
        state.config.min_slot,
    );

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();
    let orchestrator = state.orchestrator.clone();
    let run_cancel = cancel.clone();
    tokio::spawn(async move {
        let _ = orchestrator.run(history, ctx, tx, run_cancel).await;
    });
    // Dropping this handler future, or later the SSE body, cancels the run.
    let guard = cancel.drop_guard();

    // Nothing has been streamed yet, so an early failure can still be a 500.
    match rx.recv().await {
        None | Some(ChatEvent::Error { .. }) => Err(AppError::Internal),
        Some(first) => Ok(sse_stream(first, rx, guard).into_response()),
    }
}

// ============================================================
// Model info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Health and version
// ============================================================

async fn health() -> &'static str {
    "ok"
}

async fn get_version() -> &'static str {
    concat!("calendar-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    /// Details are logged where they happen; the client gets fixed text
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, PUBLIC_ERROR_MESSAGE).into_response()
            }
        }
    }
}
