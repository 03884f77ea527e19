//! Bridges one streaming connection to one broker subscription.
//!
//! The HTTP layer owns the receiving half of a frame channel and turns it into
//! the response body. When the peer goes away the body, and with it the
//! receiver, is dropped; the adapter sees that either as the channel closing
//! (disconnect hook) or as a failed send (write failure). Both end in the same
//! `close`, which unsubscribes at most once.

use crate::broker::{Broker, Delivery, SubscriptionId};
use crate::error::Error;
use crate::message::{Frame, PayloadShape};
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Connecting,
    Streaming,
    Closed,
}

pub struct StreamAdapter {
    broker: Arc<Broker>,
    payload_shape: PayloadShape,
    subscription_id: Option<SubscriptionId>,
    state: AdapterState,
}

impl StreamAdapter {
    pub fn new(broker: Arc<Broker>, payload_shape: PayloadShape) -> Self {
        Self {
            broker,
            payload_shape,
            subscription_id: None,
            state: AdapterState::Connecting,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Takes a broker subscription for this connection.
    ///
    /// On `CapacityExceeded` the adapter is closed without ever having held a slot.
    pub fn connect(&mut self) -> Result<SubscriptionId, Error> {
        debug_assert_eq!(self.state, AdapterState::Connecting);

        match self.broker.subscribe() {
            Ok(id) => {
                self.subscription_id = Some(id);
                self.state = AdapterState::Streaming;
                info!("Event stream {id} connected");
                Ok(id)
            }
            Err(err) => {
                self.state = AdapterState::Closed;
                Err(err)
            }
        }
    }

    /// Forwards every notice for this subscription to `frames` until the peer
    /// disconnects, a write fails, or the broker closes the subscription.
    pub async fn run(mut self, frames: Sender<Frame>) {
        let Some(id) = self.subscription_id.filter(|_| self.state == AdapterState::Streaming)
        else {
            return;
        };

        loop {
            let delivery = tokio::select! {
                _ = frames.closed() => {
                    debug!("Event stream {id}: peer disconnected");
                    break;
                }
                delivery = self.broker.receive(id) => delivery,
            };

            let notice = match delivery {
                Delivery::Notice(notice) => notice,
                Delivery::Closed => {
                    debug!("Event stream {id}: subscription closed by broker");
                    break;
                }
            };

            let frame = Frame::render(&notice, self.payload_shape);
            if let Err(err) = frames.send(frame).await.map_err(Error::transport_failure) {
                info!("Event stream {id}: {err}");
                break;
            }
            trace!("Event stream {id}: sent {}", notice.command);
        }

        self.close();
    }

    fn close(&mut self) {
        if self.state == AdapterState::Closed {
            return;
        }
        self.state = AdapterState::Closed;

        if let Some(id) = self.subscription_id {
            self.broker.unsubscribe(id);
            info!("Event stream {id} closed");
        }
    }
}

impl Drop for StreamAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::QueueCapacity;
    use crate::error::ErrorKind;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(1);

    fn streaming(broker: &Arc<Broker>) -> (SubscriptionId, mpsc::Receiver<Frame>, JoinHandle<()>) {
        let mut adapter = StreamAdapter::new(Arc::clone(broker), PayloadShape::Command);
        let id = adapter.connect().unwrap();
        assert_eq!(adapter.state(), AdapterState::Streaming);

        let (tx, rx) = mpsc::channel(8);
        (id, rx, tokio::spawn(adapter.run(tx)))
    }

    async fn next_frame(rx: &mut mpsc::Receiver<Frame>) -> Frame {
        timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("frame channel closed")
    }

    #[tokio::test]
    async fn test_capacity_failure_closes_without_holding_a_slot() {
        let broker = Arc::new(Broker::new(1, QueueCapacity::Unbounded));
        let _holder = broker.subscribe().unwrap();

        let mut adapter = StreamAdapter::new(Arc::clone(&broker), PayloadShape::Command);
        let err = adapter.connect().unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::CapacityExceeded {
                max_subscriptions: 1
            }
        );
        assert_eq!(adapter.state(), AdapterState::Closed);
        assert_eq!(broker.stats().in_use, 1);

        // Dropping the rejected adapter must not release the holder's slot.
        drop(adapter);
        assert_eq!(broker.stats().in_use, 1);
    }

    #[tokio::test]
    async fn test_notices_become_frames() {
        let broker = Arc::new(Broker::default());
        let (_id, mut rx, _task) = streaming(&broker);

        broker.publish("UPDATE", Some(3)).unwrap();
        broker.publish("UPDATE", None).unwrap();

        assert_eq!(next_frame(&mut rx).await.to_wire(), "data: {\"cmd\": \"UPDATE\"}\n\n");
        assert_eq!(next_frame(&mut rx).await.to_wire(), "data: {\"cmd\": \"UPDATE\"}\n\n");
    }

    #[tokio::test]
    async fn test_command_with_id_shape() {
        let broker = Arc::new(Broker::default());
        let mut adapter = StreamAdapter::new(Arc::clone(&broker), PayloadShape::CommandWithId);
        adapter.connect().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(adapter.run(tx));

        broker.publish("UPDATE", Some(3)).unwrap();

        assert_eq!(
            next_frame(&mut rx).await.data(),
            "{\"cmd\": \"UPDATE\", \"id\": 3}"
        );
    }

    #[tokio::test]
    async fn test_peer_disconnect_releases_the_slot() {
        let broker = Arc::new(Broker::new(1, QueueCapacity::Unbounded));
        let (id, rx, task) = streaming(&broker);
        assert_eq!(broker.stats().available, 0);

        drop(rx);
        timeout(WAIT, task).await.unwrap().unwrap();

        assert!(!broker.is_subscribed(id));
        assert_eq!(broker.stats().available, 1);
    }

    #[tokio::test]
    async fn test_broker_shutdown_ends_the_stream() {
        let broker = Arc::new(Broker::default());
        let (_id, mut rx, task) = streaming(&broker);

        broker.shutdown();
        timeout(WAIT, task).await.unwrap().unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_external_unsubscribe_ends_the_stream() {
        let broker = Arc::new(Broker::new(1, QueueCapacity::Unbounded));
        let (id, _rx, task) = streaming(&broker);

        assert!(broker.unsubscribe(id));
        timeout(WAIT, task).await.unwrap().unwrap();

        // The adapter's own close must not hand the slot back a second time.
        assert_eq!(broker.stats().available, 1);
        assert!(broker.subscribe().is_ok());
        assert!(broker.subscribe().is_err());
    }

    #[tokio::test]
    async fn test_dropping_a_connected_adapter_unsubscribes() {
        let broker = Arc::new(Broker::new(1, QueueCapacity::Unbounded));
        let mut adapter = StreamAdapter::new(Arc::clone(&broker), PayloadShape::Command);
        let id = adapter.connect().unwrap();

        drop(adapter);

        assert!(!broker.is_subscribed(id));
        assert_eq!(broker.stats().available, 1);
    }

    #[tokio::test]
    async fn test_two_clients_one_disconnects() {
        let broker = Arc::new(Broker::new(2, QueueCapacity::Unbounded));
        let (id_1, mut rx_1, task_1) = streaming(&broker);
        let (id_2, mut rx_2, _task_2) = streaming(&broker);
        assert_eq!((id_1.slot(), id_2.slot()), (1, 2));

        broker.publish("UPDATE", None).unwrap();
        assert_eq!(next_frame(&mut rx_1).await.data(), "{\"cmd\": \"UPDATE\"}");
        assert_eq!(next_frame(&mut rx_2).await.data(), "{\"cmd\": \"UPDATE\"}");

        drop(rx_1);
        timeout(WAIT, task_1).await.unwrap().unwrap();

        assert_eq!(broker.publish("UPDATE", None).unwrap(), 1);
        assert_eq!(next_frame(&mut rx_2).await.data(), "{\"cmd\": \"UPDATE\"}");
        assert_eq!(broker.stats().available, 1);
    }
}
