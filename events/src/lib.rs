//! Event system infrastructure for the shopping list server.
//!
//! Write handlers describe *what* changed as a [`DomainEvent`]; registered
//! [`EventHandler`]s decide what to do about it (today: notify open event
//! streams through the broker in the `sse` crate). This crate depends on no
//! other internal crate, entity data travels as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A type alias that represents any entity's id field data type.
pub type Id = i64;

/// Business-level changes, emitted after the store accepted the change.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A new item was added to the list.
    ItemCreated {
        item_id: Id,
        /// Complete serialized item, including its assigned id.
        item: Value,
    },
    /// An existing item was changed (title, status, order).
    ItemUpdated { item_id: Id, item: Value },
    /// An item was removed; only its id is left to report.
    ItemDeleted { item_id: Id },
    /// Several items got a new `orderno` at once.
    ItemsReordered { item_ids: Vec<Id> },
    /// Every item with `status` was removed.
    ItemsDeleted { status: String, count: usize },
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Returns a publisher with `handler` appended. Store the returned value.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
