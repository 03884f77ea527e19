//! Persistence boundary for list entities.
//!
//! The server only needs "persist / load entity" operations that either succeed
//! or fail with a typed [`error::Error`]. [`Store`] keeps everything in memory
//! for the life of the process.

use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub use events::Id;

pub mod error;
pub mod item;
pub mod items;

/// In-memory entity storage shared by all request handlers.
pub struct Store {
    items: DashMap<Id, items::Model>,
    next_item_id: AtomicI64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            next_item_id: AtomicI64::new(1),
        }
    }

    fn next_item_id(&self) -> Id {
        self.next_item_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
