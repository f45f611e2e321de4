//! In-memory event bus for tests and local runs.
//!
//! Provides synchronous, deterministic delivery: `publish` returns only
//! after every handler subscribed to the stream has run.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::metrics::{EventStream, MetricsError, RawMetricEvent};
use crate::ports::{EventHandler, EventSubscriber};

/// In-memory event bus.
///
/// Features:
/// - Synchronous delivery (deterministic for tests)
/// - Event capture for assertions
/// - Handler registration per stream
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe(EventStream::Users, user_listener);
///
/// bus.publish(EventStream::Users, RawMetricEvent::new("USER_ADDED", "alice", None)).await?;
/// assert_eq!(bus.event_count(), 1);
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventStream, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<(EventStream, RawMetricEvent)>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    /// Delivers `event` to every handler on `stream`.
    ///
    /// All handlers run even if one fails; the first failure is returned.
    pub async fn publish(&self, stream: EventStream, event: RawMetricEvent) -> Result<(), MetricsError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stream, event.clone()));

        // Clone handlers to release lock before await points
        let stream_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(&stream).cloned().unwrap_or_default()
        };

        let mut first_error = None;
        for handler in stream_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // === Test Helpers ===

    pub fn published_events(&self) -> Vec<(EventStream, RawMetricEvent)> {
        self.published.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn events_on(&self, stream: EventStream) -> Vec<RawMetricEvent> {
        self.published_events()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear(&self) {
        self.published.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn handler_count(&self, stream: EventStream) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&stream)
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, stream: EventStream, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(stream)
            .or_default()
            .push(handler);
    }
}
