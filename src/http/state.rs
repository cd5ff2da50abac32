use crate::config::ServiceConfig;
use crate::service::EmotionService;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Core service: registry, analysis pipeline, shutdown signal
    pub service: EmotionService,

    /// Service name reported by the info endpoints
    pub name: String,

    pub version: String,
}

impl AppState {
    pub fn new(service: EmotionService, config: &ServiceConfig) -> Self {
        Self {
            service,
            name: config.name.clone(),
            version: config.version.clone(),
        }
    }
}
