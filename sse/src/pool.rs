use serde::Serialize;
use std::collections::VecDeque;

/// Slot number handed out by the pool, always within `1..=capacity`.
pub type Slot = u32;

/// Point-in-time view of the subscription pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub capacity: usize,
    pub in_use: usize,
    pub available: usize,
}

/// Bounded FIFO of free subscription slots.
///
/// Released slots go to the back of the queue so a just-freed slot is the last
/// one to be handed out again. The pool does not know which slots are taken;
/// the broker only releases slots it knows to be live.
#[derive(Debug)]
pub(crate) struct SlotPool {
    capacity: usize,
    free: VecDeque<Slot>,
}

impl SlotPool {
    pub(crate) fn new(capacity: Slot) -> Self {
        Self {
            capacity: capacity as usize,
            free: (1..=capacity).collect(),
        }
    }

    pub(crate) fn acquire(&mut self) -> Option<Slot> {
        self.free.pop_front()
    }

    pub(crate) fn release(&mut self, slot: Slot) {
        debug_assert!(slot >= 1 && slot as usize <= self.capacity);
        debug_assert!(!self.free.contains(&slot));
        self.free.push_back(slot);
    }

    /// Drops every free slot so nothing can be acquired anymore.
    pub(crate) fn drain(&mut self) {
        self.free.clear();
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn available(&self) -> usize {
        self.free.len()
    }
}
