use super::registry::{ClientId, SessionChannel};
use super::stats::{CloseReason, SessionStats};
use crate::error::SendError;
use crate::service::EmotionService;
use chrono::Utc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Lifecycle of one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

/// Result of reading from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Audio(Vec<u8>),
    Disconnected,
}

/// Read side of a client transport
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Wait for the next audio frame. Must be cancel-safe.
    async fn receive_frame(&mut self) -> InboundFrame;
}

/// In-process transport: each message is one audio frame, a closed channel
/// is a disconnect
#[async_trait::async_trait]
impl FrameSource for mpsc::Receiver<Vec<u8>> {
    async fn receive_frame(&mut self) -> InboundFrame {
        match self.recv().await {
            Some(audio) => InboundFrame::Audio(audio),
            None => InboundFrame::Disconnected,
        }
    }
}

/// Per-connection control loop
///
/// Reads frames one at a time, so events go out in the order their audio
/// arrived and a session never has two classifications in flight.
pub struct SessionLoop {
    client_id: ClientId,
    service: EmotionService,
    shutdown: watch::Receiver<bool>,
    state: SessionState,
}

impl SessionLoop {
    pub fn new(client_id: ClientId, service: EmotionService) -> Self {
        let shutdown = service.shutdown_signal();
        Self {
            client_id,
            service,
            shutdown,
            state: SessionState::Connecting,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            "Session for client {}: {:?} -> {:?}",
            self.client_id, self.state, next
        );
        self.state = next;
    }

    /// Register `channel`, pump frames from `source` until the connection
    /// ends, then unregister
    pub async fn run<S>(&mut self, source: &mut S, channel: SessionChannel) -> SessionStats
    where
        S: FrameSource + ?Sized,
    {
        let started_at = Utc::now();
        let started = Instant::now();

        let handle = self.service.register(self.client_id.clone(), channel);
        self.transition(SessionState::Active);
        info!("Session active for client {}", self.client_id);

        let mut frames_received = 0;
        let mut events_delivered = 0;
        let mut frames_rejected = 0;
        let mut events_dropped = 0;

        let close_reason = loop {
            let frame = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut self.shutdown) => break CloseReason::Shutdown,
                frame = source.receive_frame() => frame,
            };

            let audio = match frame {
                InboundFrame::Audio(audio) => audio,
                InboundFrame::Disconnected => break CloseReason::ClientDisconnected,
            };

            if !self.service.registry().is_current(&handle) {
                break CloseReason::Superseded;
            }
            frames_received += 1;

            let analysis = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut self.shutdown) => break CloseReason::Shutdown,
                result = self.service.submit_audio(&self.client_id, &audio) => result,
            };

            let event = match analysis {
                Ok(event) => event,
                Err(e) => {
                    warn!("Rejected frame from client {}: {}", self.client_id, e);
                    frames_rejected += 1;
                    continue;
                }
            };

            match self.service.registry().send_to(&handle, event) {
                Ok(()) => events_delivered += 1,
                Err(e @ SendError::NoSuchSession(_)) => {
                    warn!("Dropped event: {}", e);
                    events_dropped += 1;
                }
                Err(e @ SendError::Superseded(_)) => {
                    info!("Dropped event: {}", e);
                    events_dropped += 1;
                    break CloseReason::Superseded;
                }
                Err(e @ SendError::DeliveryFailed(_)) => {
                    warn!("Dropped event: {}", e);
                    events_dropped += 1;
                    break CloseReason::TransportGone;
                }
            }
        };

        self.transition(SessionState::Closing);
        self.service.registry().unregister_session(&handle);
        self.transition(SessionState::Closed);

        let stats = SessionStats {
            client_id: self.client_id.clone(),
            started_at,
            duration_secs: started.elapsed().as_secs_f64(),
            frames_received,
            events_delivered,
            frames_rejected,
            events_dropped,
            close_reason,
        };

        info!(
            "Session closed for client {} ({:?}): {} frames, {} delivered, {} rejected, {} dropped",
            stats.client_id,
            stats.close_reason,
            stats.frames_received,
            stats.events_delivered,
            stats.frames_rejected,
            stats.events_dropped
        );

        stats
    }
}

/// Resolves once shutdown is signalled (or the signal's sender is gone)
async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    let _ = signal.wait_for(|stopping| *stopping).await;
}
