use crate::message::{Command, Notice};
use crate::Broker;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Turns domain events into broker notices.
///
/// Every item mutation maps to an `UPDATE` notice. Single-item events carry the
/// item id as correlation id and whether it reaches the wire is decided by the
/// stream's payload shape. Bulk events carry none.
pub struct BrokerEventHandler {
    broker: Arc<Broker>,
}

impl BrokerEventHandler {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }
}

#[async_trait]
impl EventHandler for BrokerEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let (name, notice) = match event {
            DomainEvent::ItemCreated { item_id, .. } => (
                "ItemCreated",
                Notice::with_correlation_id(Command::Update, *item_id),
            ),
            DomainEvent::ItemUpdated { item_id, .. } => (
                "ItemUpdated",
                Notice::with_correlation_id(Command::Update, *item_id),
            ),
            DomainEvent::ItemDeleted { item_id } => (
                "ItemDeleted",
                Notice::with_correlation_id(Command::Update, *item_id),
            ),
            DomainEvent::ItemsReordered { item_ids } => {
                debug!("Reordered items: {item_ids:?}");
                ("ItemsReordered", Notice::new(Command::Update))
            }
            DomainEvent::ItemsDeleted { status, count } => {
                debug!("Deleted {count} item(s) with status {status}");
                ("ItemsDeleted", Notice::new(Command::Update))
            }
        };

        let queued = self.broker.publish_notice(notice);

        debug!("{name} queued for {queued} event stream(s)");
    }
}
