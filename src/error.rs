use crate::session::ClientId;
use thiserror::Error;

/// Failure to route an event to a client's session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No live session is registered for the client
    #[error("no live session for client {0}")]
    NoSuchSession(ClientId),

    /// The session was registered but its transport is gone.
    /// The registry evicts the entry before returning this.
    #[error("delivery to client {0} failed: transport closed")]
    DeliveryFailed(ClientId),

    /// The client id now belongs to a newer session
    #[error("session for client {0} was replaced by a newer connection")]
    Superseded(ClientId),
}

/// Per-frame analysis failure. Never fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("invalid audio input: {0}")]
    InvalidInput(String),
}

/// Startup-time configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("emotion weight table invalid: {0}")]
    WeightTableInvalid(String),

    #[error("confidence range invalid: [{min}, {max}]")]
    InvalidConfidenceRange { min: f64, max: f64 },
}

/// Rejected client identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client id must not be empty")]
pub struct EmptyClientId;
