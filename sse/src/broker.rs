use crate::error::Error;
use crate::message::{Command, Notice};
use crate::pool::{PoolStats, Slot, SlotPool};
use events::Id;
use log::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, Mutex as AsyncMutex};

pub const DEFAULT_MAX_SUBSCRIPTIONS: Slot = 100;

/// Identifies one live subscription.
///
/// `slot` is the reusable pool number; `generation` is unique for the lifetime
/// of the broker, so an id kept around after its slot was handed to somebody
/// else no longer matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    slot: Slot,
    generation: u64,
}

impl SubscriptionId {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.slot, self.generation)
    }
}

/// Outcome of waiting on a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Notice(Notice),
    /// The subscription was removed, never existed, or the broker shut down.
    Closed,
}

/// How many undelivered notices a single subscription may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueCapacity {
    #[default]
    Unbounded,
    /// Once full, newer notices for that subscription are dropped.
    Bounded(usize),
}

impl QueueCapacity {
    /// `0` means unbounded.
    pub fn from_config(capacity: usize) -> Self {
        match capacity {
            0 => QueueCapacity::Unbounded,
            n => QueueCapacity::Bounded(n),
        }
    }
}

enum Outbox {
    Unbounded(mpsc::UnboundedSender<Notice>),
    Bounded(mpsc::Sender<Notice>),
}

impl Outbox {
    /// Never waits. Returns `false` if the notice was dropped.
    fn offer(&self, notice: Notice) -> bool {
        match self {
            Outbox::Unbounded(sender) => sender.send(notice).is_ok(),
            Outbox::Bounded(sender) => sender.try_send(notice).is_ok(),
        }
    }
}

enum Inbox {
    Unbounded(mpsc::UnboundedReceiver<Notice>),
    Bounded(mpsc::Receiver<Notice>),
}

impl Inbox {
    async fn recv(&mut self) -> Option<Notice> {
        match self {
            Inbox::Unbounded(receiver) => receiver.recv().await,
            Inbox::Bounded(receiver) => receiver.recv().await,
        }
    }
}

fn delivery_queue(capacity: QueueCapacity) -> (Outbox, Inbox) {
    match capacity {
        QueueCapacity::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Outbox::Unbounded(tx), Inbox::Unbounded(rx))
        }
        QueueCapacity::Bounded(n) => {
            let (tx, rx) = mpsc::channel(n);
            (Outbox::Bounded(tx), Inbox::Bounded(rx))
        }
    }
}

struct Listener {
    generation: u64,
    outbox: Outbox,
    inbox: Arc<AsyncMutex<Inbox>>,
}

struct Registry {
    pool: SlotPool,
    listeners: HashMap<Slot, Listener>,
    next_generation: u64,
    shut_down: bool,
}

impl Registry {
    fn listener(&self, id: SubscriptionId) -> Option<&Listener> {
        self.listeners
            .get(&id.slot)
            .filter(|listener| listener.generation == id.generation)
    }
}

/// In-process publish/subscribe hub between write handlers and open event streams.
///
/// All bookkeeping (slot map, pool, generation counter) sits behind one mutex that
/// is never held across an await. Each subscription has its own queue, so a
/// publish only enqueues and returns; slow or vanished consumers can not hold up
/// the publisher or each other.
pub struct Broker {
    registry: Mutex<Registry>,
    queue_capacity: QueueCapacity,
}

impl Broker {
    pub fn new(max_subscriptions: Slot, queue_capacity: QueueCapacity) -> Self {
        Self {
            registry: Mutex::new(Registry {
                pool: SlotPool::new(max_subscriptions),
                listeners: HashMap::new(),
                next_generation: 1,
                shut_down: false,
            }),
            queue_capacity,
        }
    }

    // A panic while holding the lock can not leave the registry half-updated:
    // every critical section finishes its map and pool changes before anything
    // that could panic.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new listener and returns its id.
    pub fn subscribe(&self) -> Result<SubscriptionId, Error> {
        let mut registry = self.registry();
        let max_subscriptions = registry.pool.capacity();

        if registry.shut_down {
            warn!("Rejecting subscription, broker is shut down");
            return Err(Error::capacity_exceeded(max_subscriptions));
        }

        let slot = registry.pool.acquire().ok_or_else(|| {
            warn!("Rejecting subscription, all {max_subscriptions} slots are in use");
            Error::capacity_exceeded(max_subscriptions)
        })?;

        let generation = registry.next_generation;
        registry.next_generation += 1;

        let (outbox, inbox) = delivery_queue(self.queue_capacity);
        registry.listeners.insert(
            slot,
            Listener {
                generation,
                outbox,
                inbox: Arc::new(AsyncMutex::new(inbox)),
            },
        );

        let id = SubscriptionId { slot, generation };
        debug!(
            "Subscribed {id}, {} slot(s) left",
            registry.pool.available()
        );
        Ok(id)
    }

    /// Removes a listener and returns its slot to the pool.
    ///
    /// Safe to call any number of times and with ids that were never issued.
    /// Returns whether a live subscription was actually removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();

        if registry.listener(id).is_none() {
            trace!("Ignoring unsubscribe of unknown or stale subscription {id}");
            return false;
        }

        registry.listeners.remove(&id.slot);
        registry.pool.release(id.slot);
        debug!(
            "Unsubscribed {id}, {} slot(s) left",
            registry.pool.available()
        );
        true
    }

    /// Validates `command` against the whitelist and broadcasts it.
    ///
    /// Returns how many subscriptions the notice was queued for.
    pub fn publish(&self, command: &str, correlation_id: Option<Id>) -> Result<usize, Error> {
        let command = command.parse::<Command>().map_err(|err| {
            error!("Refusing to publish: {err}");
            err
        })?;

        let notice = match correlation_id {
            Some(id) => Notice::with_correlation_id(command, id),
            None => Notice::new(command),
        };
        Ok(self.publish_notice(notice))
    }

    /// Queues `notice` for every subscription registered right now.
    ///
    /// Typed path for callers that already hold a `Notice`: its command comes
    /// from the `Command` enum, so there is nothing left to validate.
    pub fn publish_notice(&self, notice: Notice) -> usize {
        let registry = self.registry();

        let mut queued = 0;
        for (slot, listener) in registry.listeners.iter() {
            if listener.outbox.offer(notice.clone()) {
                queued += 1;
            } else {
                debug!("Dropped {} for subscription slot {slot}", notice.command);
            }
        }

        debug!(
            "Published {} to {queued} of {} subscription(s)",
            notice.command,
            registry.listeners.len()
        );
        queued
    }

    /// Waits for the next notice for `id`.
    ///
    /// Returns [`Delivery::Closed`] right away for unknown or stale ids, and as
    /// soon as the subscription is removed while waiting.
    pub async fn receive(&self, id: SubscriptionId) -> Delivery {
        let inbox = match self.registry().listener(id) {
            Some(listener) => Arc::clone(&listener.inbox),
            None => return Delivery::Closed,
        };

        let notice = inbox.lock().await.recv().await;
        match notice {
            // Notices still buffered when the subscription went away are not delivered.
            Some(notice) if self.is_subscribed(id) => Delivery::Notice(notice),
            _ => Delivery::Closed,
        }
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry().listener(id).is_some()
    }

    pub fn stats(&self) -> PoolStats {
        let registry = self.registry();
        PoolStats {
            capacity: registry.pool.capacity(),
            in_use: registry.listeners.len(),
            available: registry.pool.available(),
        }
    }

    /// Closes every subscription and refuses new ones from now on.
    pub fn shutdown(&self) {
        let mut registry = self.registry();
        let closed = registry.listeners.len();

        registry.shut_down = true;
        registry.listeners.clear();
        registry.pool.drain();

        info!("Event broker shut down, closed {closed} subscription(s)");
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBSCRIPTIONS, QueueCapacity::default())
    }
}
