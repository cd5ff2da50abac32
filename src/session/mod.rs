//! Client session management
//!
//! This module provides:
//! - `ConnectionRegistry`: client id → outbound channel routing
//! - `SessionLoop`: the per-connection read/analyse/send loop
//! - Session statistics reported when a loop ends

mod registry;
mod session;
mod stats;

pub use registry::{ClientId, ConnectionRegistry, SessionChannel, SessionHandle};
pub use session::{FrameSource, InboundFrame, SessionLoop, SessionState};
pub use stats::{CloseReason, SessionStats};
