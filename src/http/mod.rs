//! HTTP and WebSocket surface
//!
//! - GET / and GET /api - Service info
//! - GET /health and GET /api/health - Liveness
//! - GET /ws/:client_id - Audio streaming WebSocket for a named client
//! - GET /ws - Audio streaming WebSocket with a generated client id

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::{cors_layer, create_router};
pub use state::AppState;
pub use ws::WebSocketFrames;
