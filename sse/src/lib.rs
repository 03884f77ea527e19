//! In-process event notification hub for server-push streams.
//!
//! Write handlers announce "something changed"; every open event stream hears
//! about it in near real time.
//!
//! # Architecture
//!
//! - **Broker**: owns a bounded pool of reusable subscription slots and one
//!   delivery queue per subscription. Publishing validates the command against
//!   a fixed whitelist and enqueues it for every subscription registered at
//!   that moment. It knows nothing about HTTP.
//! - **Stream adapter**: one per connection. Subscribes on accept, turns each
//!   delivered notice into a `data: {"cmd": "UPDATE"}` frame and unsubscribes
//!   when the peer disconnects or a write fails.
//! - **Ephemeral messages**: a client that is not connected misses the notice
//!   and reloads fresh data when it reconnects. No replay, no deduplication.
//!
//! # Message Flow
//!
//! 1. Client opens `GET /events`; the adapter takes a slot or the request is
//!    answered with 503 so the client can retry later.
//! 2. A write handler persists a change and publishes a `DomainEvent`.
//! 3. [`domain_event_handler::BrokerEventHandler`] publishes an `UPDATE`
//!    notice to the [`Broker`].
//! 4. Each adapter task receives the notice from its own queue and writes one
//!    frame to its connection.
//!
//! # Modules
//!
//! - `broker`: subscription registry, fan-out and blocking receive
//! - `pool`: bounded FIFO of reusable slot numbers
//! - `adapter`: per-connection stream state machine
//! - `message`: command whitelist, notices and wire frames
//! - `domain_event_handler`: bridge from `events` to the broker
//! - `error`: error kinds surfaced by the hub

pub mod adapter;
pub mod broker;
pub mod domain_event_handler;
pub mod error;
pub mod message;
pub mod pool;

pub use broker::Broker;
