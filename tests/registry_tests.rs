// Connection registry tests: routing, replacement, eviction on failed
// delivery, and concurrent use from many tasks.

use empathic_call::emotion::{Classification, SuggestionCatalog};
use empathic_call::{ClientId, ConnectionRegistry, EmotionEvent, EmotionLabel, SendError, SessionChannel};
use std::sync::Arc;

fn client(id: &str) -> ClientId {
    ClientId::new(id).unwrap()
}

fn event(label: EmotionLabel) -> EmotionEvent {
    let classification = Classification {
        label,
        confidence: 0.8,
        timestamp: 1.5,
    };
    EmotionEvent::new(classification, SuggestionCatalog::new().lookup(label))
}

#[test]
fn test_send_reaches_registered_session() {
    let registry = ConnectionRegistry::new();
    let (channel, mut rx) = SessionChannel::new();

    registry.register(client("c1"), channel);
    registry.send(&client("c1"), event(EmotionLabel::Happy)).unwrap();

    let received = rx.try_recv().unwrap();
    assert_eq!(received.label(), EmotionLabel::Happy);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_second_registration_replaces_first() {
    let registry = ConnectionRegistry::new();
    let (a, mut rx_a) = SessionChannel::new();
    let (b, mut rx_b) = SessionChannel::new();

    registry.register(client("c1"), a);
    registry.register(client("c1"), b);
    assert_eq!(registry.len(), 1);

    registry.send(&client("c1"), event(EmotionLabel::Sad)).unwrap();

    assert_eq!(rx_b.try_recv().unwrap().label(), EmotionLabel::Sad);
    // A was dropped from the registry, so its receiver sees no event
    assert!(rx_a.try_recv().is_err());
}

#[test]
fn test_send_to_unknown_client() {
    let registry = ConnectionRegistry::new();
    let (channel, _rx) = SessionChannel::new();
    registry.register(client("c1"), channel);

    let result = registry.send(&client("ghost"), event(EmotionLabel::Neutral));

    assert_eq!(result, Err(SendError::NoSuchSession(client("ghost"))));
    assert_eq!(registry.len(), 1);
    assert!(!registry.contains(&client("ghost")));
    assert!(registry.contains(&client("c1")));
}

#[test]
fn test_failed_delivery_evicts_session() {
    let registry = ConnectionRegistry::new();
    let (channel, rx) = SessionChannel::new();
    registry.register(client("c2"), channel);

    // Transport went away
    drop(rx);

    let result = registry.send(&client("c2"), event(EmotionLabel::Angry));
    assert_eq!(result, Err(SendError::DeliveryFailed(client("c2"))));
    assert!(!registry.contains(&client("c2")));

    // Further sends no longer pile up against the dead channel
    let result = registry.send(&client("c2"), event(EmotionLabel::Angry));
    assert_eq!(result, Err(SendError::NoSuchSession(client("c2"))));

    let (replacement, mut rx_c) = SessionChannel::new();
    registry.register(client("c2"), replacement);
    registry.send(&client("c2"), event(EmotionLabel::Happy)).unwrap();
    assert_eq!(rx_c.try_recv().unwrap().label(), EmotionLabel::Happy);
}

#[test]
fn test_unregister_is_idempotent() {
    let registry = ConnectionRegistry::new();
    let (channel, _rx) = SessionChannel::new();
    registry.register(client("c1"), channel);

    assert!(registry.unregister(&client("c1")));
    assert!(!registry.unregister(&client("c1")));
    assert!(!registry.unregister(&client("never-seen")));
    assert!(registry.is_empty());
}

#[test]
fn test_stale_handle_does_not_remove_newer_session() {
    let registry = ConnectionRegistry::new();
    let (a, _rx_a) = SessionChannel::new();
    let (b, mut rx_b) = SessionChannel::new();

    let old = registry.register(client("c3"), a);
    let new = registry.register(client("c3"), b);

    assert!(!registry.unregister_session(&old));
    assert!(registry.is_current(&new));

    registry.send(&client("c3"), event(EmotionLabel::Frustrated)).unwrap();
    assert_eq!(rx_b.try_recv().unwrap().label(), EmotionLabel::Frustrated);

    assert!(registry.unregister_session(&new));
    assert!(!registry.contains(&client("c3")));
}

#[test]
fn test_send_to_stale_handle_never_reaches_replacement() {
    let registry = ConnectionRegistry::new();
    let (a, mut rx_a) = SessionChannel::new();
    let (b, mut rx_b) = SessionChannel::new();

    let old = registry.register(client("c4"), a);
    registry.send_to(&old, event(EmotionLabel::Happy)).unwrap();
    assert_eq!(rx_a.try_recv().unwrap().label(), EmotionLabel::Happy);

    let new = registry.register(client("c4"), b);
    let result = registry.send_to(&old, event(EmotionLabel::Angry));
    assert_eq!(result, Err(SendError::Superseded(client("c4"))));
    assert!(rx_b.try_recv().is_err());
    assert!(registry.is_current(&new));

    registry.send_to(&new, event(EmotionLabel::Sad)).unwrap();
    assert_eq!(rx_b.try_recv().unwrap().label(), EmotionLabel::Sad);

    registry.unregister_session(&new);
    let result = registry.send_to(&new, event(EmotionLabel::Sad));
    assert_eq!(result, Err(SendError::NoSuchSession(client("c4"))));
}

#[test]
fn test_events_arrive_in_send_order() {
    let registry = ConnectionRegistry::new();
    let (channel, mut rx) = SessionChannel::new();
    registry.register(client("c1"), channel);

    let order = [
        EmotionLabel::Neutral,
        EmotionLabel::Angry,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
    ];
    for label in order {
        registry.send(&client("c1"), event(label)).unwrap();
    }

    let received: Vec<EmotionLabel> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|e| e.label())
        .collect();
    assert_eq!(received, order.to_vec());
}

#[test]
fn test_introspection() {
    let registry = ConnectionRegistry::new();
    assert!(registry.is_empty());

    for id in ["a", "b", "c"] {
        let (channel, _rx) = SessionChannel::new();
        registry.register(client(id), channel);
    }

    let mut ids = registry.client_ids();
    ids.sort();
    assert_eq!(ids, vec![client("a"), client("b"), client("c")]);
    assert!(registry.connected_at(&client("b")).is_some());
    assert!(registry.connected_at(&client("z")).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions() {
    let registry = Arc::new(ConnectionRegistry::new());

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let id = client(&format!("client-{}", i));
                let (channel, mut rx) = SessionChannel::new();
                let handle = registry.register(id.clone(), channel);

                for _ in 0..50 {
                    registry.send(&id, event(EmotionLabel::Neutral)).unwrap();
                    tokio::task::yield_now().await;
                }

                let mut received = 0;
                while rx.try_recv().is_ok() {
                    received += 1;
                }

                assert!(registry.unregister_session(&handle));
                received
            })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert_eq!(task.unwrap(), 50);
    }

    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replacement_keeps_one_session() {
    let registry = Arc::new(ConnectionRegistry::new());
    let id = client("shared");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            tokio::spawn(async move {
                let (channel, rx) = SessionChannel::new();
                let handle = registry.register(id, channel);
                (handle, rx)
            })
        })
        .collect();

    let mut sessions = Vec::new();
    for task in futures::future::join_all(tasks).await {
        sessions.push(task.unwrap());
    }

    assert_eq!(registry.len(), 1);
    let current: Vec<_> = sessions
        .iter()
        .filter(|(handle, _)| registry.is_current(handle))
        .collect();
    assert_eq!(current.len(), 1);

    // Only the winning registration receives the event
    registry.send(&id, event(EmotionLabel::Happy)).unwrap();
    let delivered = sessions
        .iter_mut()
        .filter_map(|(_, rx)| rx.try_recv().ok())
        .count();
    assert_eq!(delivered, 1);
}
