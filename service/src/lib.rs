use config::Config;
use entity_api::Store;
use events::EventPublisher;
use log::info;
use sse::broker::Broker;
use sse::domain_event_handler::BrokerEventHandler;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Process-wide state handed to every handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub broker: Arc<Broker>,
    pub store: Arc<Store>,
    pub event_publisher: EventPublisher,
}

impl AppState {
    /// Builds a fresh broker and store and wires the broker up as an event handler.
    pub fn new(app_config: Config) -> Self {
        info!(
            "Event broker config: max_subscriptions={}, queue_capacity={:?}, payload_shape={}",
            app_config.max_subscriptions,
            app_config.queue_capacity(),
            app_config.payload_shape,
        );

        let broker = Arc::new(Broker::new(
            app_config.max_subscriptions,
            app_config.queue_capacity(),
        ));
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(BrokerEventHandler::new(Arc::clone(&broker))));

        Self {
            config: app_config,
            broker,
            store: Arc::new(Store::new()),
            event_publisher,
        }
    }

    pub fn store_ref(&self) -> &Store {
        self.store.as_ref()
    }
}
