//! Event Bus implementation.
//!
//! Provides the per-document EventBus used for invalidation and status
//! notifications. Events raised while a batch is open are held back and
//! delivered when the outermost batch closes, with repeated invalidations
//! of the same layer or gradient folded into one.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EditorEvent, EventCategory, StructureEvent};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(EditorEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Fold repeated invalidations raised inside a batch.
    ///
    /// When off, batches are ignored and every event goes out immediately.
    pub coalesce_batches: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            coalesce_batches: true,
        }
    }
}

/// Error types for event bus operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

#[derive(Debug, Default)]
struct Batch {
    depth: usize,
    pending: Vec<EditorEvent>,
}

impl Batch {
    /// Queue `event`, dropping it when an identical invalidation is already
    /// waiting. Structural changes and history/status messages always queue.
    fn queue(&mut self, event: EditorEvent) {
        if is_invalidation(&event) && self.pending.contains(&event) {
            return;
        }
        self.pending.push(event);
    }
}

fn is_invalidation(event: &EditorEvent) -> bool {
    matches!(
        event,
        EditorEvent::BoundsChanged { .. }
            | EditorEvent::PropertyChanged { .. }
            | EditorEvent::ResourceChanged { .. }
            | EditorEvent::Structure(StructureEvent::NodesChanged { .. })
    )
}

/// Per-document event bus
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
    handlers: Arc<RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>>,
    batch: Mutex<Batch>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            batch: Mutex::new(Batch::default()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of broadcast receivers that will receive the event,
    /// or an error if nobody at all is listening. An event held back by an
    /// open batch counts as delivered to nobody yet and returns `Ok(0)`.
    pub fn publish(&self, event: EditorEvent) -> Result<usize, EventBusError> {
        {
            let mut batch = self.batch.lock();
            if batch.depth > 0 {
                batch.queue(event);
                return Ok(0);
            }
        }
        self.dispatch(event)
    }

    /// Publish, ignoring the absence of listeners
    pub fn notify(&self, event: EditorEvent) {
        self.publish(event).ok();
    }

    /// Start holding events back. Batches nest; only the outermost
    /// [`end_batch`](Self::end_batch) delivers.
    pub fn begin_batch(&self) {
        if !self.config.coalesce_batches {
            return;
        }
        self.batch.lock().depth += 1;
    }

    /// Close a batch. Returns how many events were delivered.
    pub fn end_batch(&self) -> usize {
        if !self.config.coalesce_batches {
            return 0;
        }
        let pending = {
            let mut batch = self.batch.lock();
            match batch.depth {
                0 => {
                    tracing::warn!("end_batch without a matching begin_batch");
                    return 0;
                }
                1 => {
                    batch.depth = 0;
                    std::mem::take(&mut batch.pending)
                }
                _ => {
                    batch.depth -= 1;
                    return 0;
                }
            }
        };
        let delivered = pending.len();
        for event in pending {
            self.dispatch(event).ok();
        }
        delivered
    }

    /// Whether events are currently being held back.
    pub fn in_batch(&self) -> bool {
        self.batch.lock().depth > 0
    }

    fn dispatch(&self, event: EditorEvent) -> Result<usize, EventBusError> {
        let handlers = self.handlers.read();
        for (_, (filter, handler)) in handlers.iter() {
            if filter.matches(&event) {
                handler(event.clone());
            }
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) => {
                if handlers.is_empty() {
                    Err(EventBusError::NoSubscribers)
                } else {
                    Ok(0)
                }
            }
        }
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler runs on the edit thread, after the change it reports. It
    /// may read history state (`position`, `can_undo`, descriptions) but must
    /// not start another edit or history step, and must not call back into
    /// this bus. Keep it short.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(EditorEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for polling events from another thread
    pub fn receiver(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("in_batch", &self.in_batch())
            .field("config", &self.config)
            .finish()
    }
}
