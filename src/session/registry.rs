use crate::emotion::EmotionEvent;
use crate::error::{EmptyClientId, SendError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Opaque, non-empty client identifier supplied by the transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyClientId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EmptyClientId);
        }
        Ok(Self(id))
    }

    /// Fresh id for connections that did not name themselves
    pub fn generate() -> Self {
        Self(format!("client-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound half of a session: events pushed here are written to the
/// client in order by the transport's writer task
#[derive(Debug, Clone)]
pub struct SessionChannel {
    tx: mpsc::UnboundedSender<EmotionEvent>,
}

impl SessionChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EmotionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// False once the writer side has gone away
    fn deliver(&self, event: EmotionEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Identifies one particular registration of a client id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    client_id: ClientId,
    session_id: u64,
}

impl SessionHandle {
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }
}

#[derive(Debug)]
struct SessionEntry {
    session_id: u64,
    channel: SessionChannel,
    connected_at: DateTime<Utc>,
}

/// Live sessions, at most one per client id
///
/// Backed by a sharded map so unrelated clients never contend on one lock.
/// Removals triggered by a session itself compare the stored session id, so
/// a stale session can never remove the registration that replaced it.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    sessions: Arc<DashMap<ClientId, SessionEntry>>,
    next_session_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the session for `client_id` (last writer wins).
    /// A replaced channel is dropped from the registry but not closed here.
    pub fn register(&self, client_id: ClientId, channel: SessionChannel) -> SessionHandle {
        let session_id = self.next_session_id.fetch_add(1, Ordering::SeqCst) + 1;

        let previous = self.sessions.insert(
            client_id.clone(),
            SessionEntry {
                session_id,
                channel,
                connected_at: Utc::now(),
            },
        );

        match previous {
            Some(old) => info!(
                "Replaced session {} for client {} with session {}",
                old.session_id, client_id, session_id
            ),
            None => info!("Registered session {} for client {}", session_id, client_id),
        }

        SessionHandle {
            client_id,
            session_id,
        }
    }

    /// Remove whatever session `client_id` has; no-op when absent
    pub fn unregister(&self, client_id: &ClientId) -> bool {
        match self.sessions.remove(client_id) {
            Some((_, entry)) => {
                info!(
                    "Unregistered session {} for client {}",
                    entry.session_id, client_id
                );
                true
            }
            None => false,
        }
    }

    /// Remove the session only if it is still the one `handle` refers to
    pub fn unregister_session(&self, handle: &SessionHandle) -> bool {
        let removed = self
            .sessions
            .remove_if(&handle.client_id, |_, entry| {
                entry.session_id == handle.session_id
            })
            .is_some();

        if removed {
            info!(
                "Unregistered session {} for client {}",
                handle.session_id, handle.client_id
            );
        } else {
            debug!(
                "Session {} for client {} already gone or replaced",
                handle.session_id, handle.client_id
            );
        }

        removed
    }

    /// Best-effort delivery to the client's current session.
    ///
    /// A closed channel evicts its entry, unless a newer registration has
    /// already replaced it.
    pub fn send(&self, client_id: &ClientId, event: EmotionEvent) -> Result<(), SendError> {
        self.route(client_id, None, event)
    }

    /// Deliver only while `handle` is still the registered session, so an
    /// event produced by a replaced connection never reaches its successor
    pub fn send_to(&self, handle: &SessionHandle, event: EmotionEvent) -> Result<(), SendError> {
        self.route(&handle.client_id, Some(handle.session_id), event)
    }

    fn route(
        &self,
        client_id: &ClientId,
        expected_session: Option<u64>,
        event: EmotionEvent,
    ) -> Result<(), SendError> {
        // Shard guard must be released before eviction takes the write lock
        let (session_id, delivered) = match self.sessions.get(client_id) {
            Some(entry) if expected_session.is_some_and(|id| id != entry.session_id) => {
                debug!(
                    "Dropped {} event for client {}: replaced by session {}",
                    event.label(),
                    client_id,
                    entry.session_id
                );
                return Err(SendError::Superseded(client_id.clone()));
            }
            Some(entry) => (entry.session_id, entry.channel.deliver(event)),
            None => return Err(SendError::NoSuchSession(client_id.clone())),
        };

        if delivered {
            debug!(
                "Sent {} event to client {} (session {})",
                event.label(),
                client_id,
                session_id
            );
            return Ok(());
        }

        let evicted = self
            .sessions
            .remove_if(client_id, |_, entry| entry.session_id == session_id)
            .is_some();
        if evicted {
            warn!(
                "Evicted stale session {} for client {} after failed delivery",
                session_id, client_id
            );
        }

        Err(SendError::DeliveryFailed(client_id.clone()))
    }

    /// Whether `handle` is still the registered session for its client
    pub fn is_current(&self, handle: &SessionHandle) -> bool {
        self.sessions
            .get(&handle.client_id)
            .is_some_and(|entry| entry.session_id == handle.session_id)
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.sessions.contains_key(client_id)
    }

    pub fn connected_at(&self, client_id: &ClientId) -> Option<DateTime<Utc>> {
        self.sessions.get(client_id).map(|entry| entry.connected_at)
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_rejects_blank() {
        assert_eq!(ClientId::new(""), Err(EmptyClientId));
        assert_eq!(ClientId::new("   "), Err(EmptyClientId));
        assert_eq!(ClientId::new("c1").unwrap().as_str(), "c1");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("client-"));
    }

    #[test]
    fn session_ids_increase_per_registration() {
        let registry = ConnectionRegistry::new();
        let id = ClientId::new("c1").unwrap();
        let (a, _rx_a) = SessionChannel::new();
        let (b, _rx_b) = SessionChannel::new();

        let first = registry.register(id.clone(), a);
        let second = registry.register(id, b);

        assert!(second.session_id() > first.session_id());
        assert!(!registry.is_current(&first));
        assert!(registry.is_current(&second));
    }
}
