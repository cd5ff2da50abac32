use super::registry::ClientId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a session loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Client closed the connection or the read side failed
    ClientDisconnected,
    /// Outbound delivery failed, the transport is gone
    TransportGone,
    /// A newer connection registered the same client id
    Superseded,
    /// Service shutdown was requested
    Shutdown,
}

/// Statistics about a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub client_id: ClientId,

    /// When the session was accepted
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Audio frames read from the transport
    pub frames_received: usize,

    /// Events handed to the outbound channel
    pub events_delivered: usize,

    /// Frames refused by the frame policy
    pub frames_rejected: usize,

    /// Events classified but not delivered
    pub events_dropped: usize,

    pub close_reason: CloseReason,
}
