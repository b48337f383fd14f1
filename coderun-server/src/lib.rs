use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use coderun::{
    CodeRunner, CompileResult, ExecutionRequest, ExecutionResult, FailureKind, Language,
    LanguageStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ServerError::Internal(message) => {
                error!("Request failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "error", "error": message })),
                )
                    .into_response()
            }
            ServerError::ServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Body of `POST /api/compile/execute`.
///
/// Missing fields deserialize to empty strings so they are reported through
/// the same validation path as blank ones.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

/// Body of `POST /api/compile/compile`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CompileRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Clone)]
pub struct AppState {
    runner: Arc<dyn CodeRunner>,
}

pub fn create_app(runner: Arc<dyn CodeRunner>) -> Router {
    let state = AppState { runner };

    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/compile/execute", post(execute))
        .route("/api/compile/compile", post(compile))
        .route("/api/languages", get(languages))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting coderun server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "message": "coderun is running" }))
}

async fn execute(
    State(state): State<AppState>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<Json<ExecutionResult>, ServerError> {
    validate(&payload.code, &payload.language)?;

    let request = ExecutionRequest::new(payload.code, payload.language)
        .with_stdin(payload.input.unwrap_or_default());
    let result = state.runner.execute(request).await;

    if result.failure == Some(FailureKind::SystemError) {
        return Err(ServerError::Internal(result.error));
    }
    Ok(Json(result))
}

async fn compile(
    State(state): State<AppState>,
    Json(payload): Json<CompileRequest>,
) -> Result<Json<CompileResult>, ServerError> {
    validate(&payload.code, &payload.language)?;

    let result = state.runner.compile(payload.code, payload.language).await;

    if result.failure == Some(FailureKind::SystemError) {
        let message = result.error.unwrap_or_default();
        return Err(ServerError::Internal(message));
    }
    Ok(Json(result))
}

async fn languages(State(state): State<AppState>) -> Json<Vec<LanguageStatus>> {
    Json(state.runner.languages())
}

fn validate(code: &str, language: &str) -> Result<(), ServerError> {
    let mut errors = Vec::new();

    if code.trim().is_empty() {
        errors.push(FieldError::new("code", "Code is required"));
    }
    if language.trim().is_empty() {
        errors.push(FieldError::new("language", "Language is required"));
    } else if language.parse::<Language>().is_err() {
        errors.push(FieldError::new("language", "Invalid language"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServerError::Validation(errors))
    }
}
