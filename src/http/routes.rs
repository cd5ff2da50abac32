use super::handlers;
use super::state::AppState;
use super::ws;
use crate::config::CorsConfig;
use axum::{http::HeaderValue, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        // Service info
        .route("/", get(handlers::service_info))
        .route("/api", get(handlers::service_info))
        // Health checks
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        // Audio streaming
        .route("/ws", get(ws::anonymous_ws_handler))
        .route("/ws/:client_id", get(ws::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors)),
        )
        .with_state(state)
}

/// Build the CORS policy.
///
/// Credentials cannot be combined with wildcards, so an explicit origin
/// list mirrors the request's method and headers instead.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
