//! Domain events emitted by the router layer.
//!
//! Backend registry and connection-state changes publish to a single
//! subscriber list; the service layer subscribes and triggers snapshot
//! rebuilds. There is no implicit dependency tracking; this explicit
//! observer seam is the whole notification mechanism.

pub mod vfs;

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use vfs::VfsEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: VfsEvent,
}

impl TreeEvent {
    /// Create a new event.
    pub fn new(payload: VfsEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// A receiver of published events.
pub trait EventSubscriber: Send + Sync {
    /// Handle one event. Must not block; long-running reactions should be
    /// forwarded to a task.
    fn on_event(&self, event: &TreeEvent);
}

/// A single-process event bus with an explicit subscriber list.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. Subscribers are invoked in registration order.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers
            .write()
            .expect("event bus lock poisoned")
            .push(subscriber);
    }

    /// Publish an event to every subscriber.
    pub fn publish(&self, payload: VfsEvent) {
        let event = TreeEvent::new(payload);
        tracing::debug!(event = ?event.payload, "Publishing event");
        let subscribers = self
            .subscribers
            .read()
            .expect("event bus lock poisoned")
            .clone();
        for subscriber in subscribers {
            subscriber.on_event(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("EventBus")
            .field("subscribers", &count)
            .finish()
    }
}

/// A subscriber that forwards events into a tokio channel, decoupling
/// publication from the async reaction (e.g., a snapshot rebuild task).
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    tx: tokio::sync::mpsc::UnboundedSender<TreeEvent>,
}

impl ChannelSubscriber {
    /// Create a subscriber and its receiving end.
    pub fn channel() -> (Self, tokio::sync::mpsc::UnboundedReceiver<TreeEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSubscriber for ChannelSubscriber {
    fn on_event(&self, event: &TreeEvent) {
        // Receiver gone means shutdown; nothing to do.
        let _ = self.tx.send(event.clone());
    }
}
