use crate::config::AnalysisConfig;
use crate::emotion::{AnalysisPipeline, EmotionEvent};
use crate::error::{AnalysisError, ConfigError};
use crate::session::{ClientId, ConnectionRegistry, SessionChannel, SessionHandle};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Core service handle shared by every connection
///
/// Owns the connection registry, the analysis pipeline and the shutdown
/// signal. Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct EmotionService {
    registry: ConnectionRegistry,
    pipeline: Arc<AnalysisPipeline>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl EmotionService {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            registry: ConnectionRegistry::new(),
            pipeline: Arc::new(pipeline),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Build the service from settings; fails on an invalid weight table
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let pipeline = AnalysisPipeline::from_config(config)?;
        info!(
            "Emotion service initialized (classifier: {})",
            pipeline.classifier_name()
        );
        Ok(Self::new(pipeline))
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    pub fn register(&self, client_id: ClientId, channel: SessionChannel) -> SessionHandle {
        self.registry.register(client_id, channel)
    }

    pub fn unregister(&self, client_id: &ClientId) -> bool {
        self.registry.unregister(client_id)
    }

    /// Analyse one audio chunk received from `client_id`
    pub async fn submit_audio(
        &self,
        client_id: &ClientId,
        audio: &[u8],
    ) -> Result<EmotionEvent, AnalysisError> {
        debug!("Received {} bytes of audio from client {}", audio.len(), client_id);

        let event = self.pipeline.analyze(audio).await?;

        debug!(
            "Processed emotion for client {}: {} ({:.2})",
            client_id,
            event.label(),
            event.confidence()
        );

        Ok(event)
    }

    /// Ask every session loop to close
    pub fn shutdown(&self) {
        info!(
            "Shutdown requested, closing {} active session(s)",
            self.registry.len()
        );
        self.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}
