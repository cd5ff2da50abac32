use super::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ServiceInfoResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / and GET /api
/// Service banner
pub async fn service_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(ServiceInfoResponse {
        message: format!("Welcome to {}", state.name),
        version: state.version.clone(),
        status: "running".to_string(),
    })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "services": {
                "emotion_detection": "operational"
            }
        })),
    )
}

/// GET /api/health
/// Minimal liveness probe
pub async fn api_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
