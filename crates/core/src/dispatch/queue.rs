//! FIFO ticket queue with a single releasable slot.

use std::collections::VecDeque;
use std::fmt;

use uuid::Uuid;

/// Opaque identifier for one pending throttled call.
///
/// Generated fresh per acquisition and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId(Uuid);

impl TicketId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered pending tickets plus the single releasable slot.
///
/// Insertion order is submission order and a ticket appears at most once.
/// The slot holds the head as of the most recent tick, or nothing. Removing
/// the releasable ticket clears the slot rather than promoting the next
/// head, so at most one waiter proceeds per tick.
#[derive(Debug, Default)]
pub struct TicketQueue {
    pending: VecDeque<TicketId>,
    releasable: Option<TicketId>,
}

impl TicketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. Duplicate enqueues are no-ops.
    pub fn enqueue(&mut self, id: TicketId) {
        if !self.pending.contains(&id) {
            self.pending.push_back(id);
        }
    }

    /// Remove `id` wherever it occurs; absent ids are no-ops. Clears the
    /// releasable slot when it held `id`.
    pub fn remove(&mut self, id: TicketId) {
        if let Some(pos) = self.pending.iter().position(|queued| *queued == id) {
            self.pending.remove(pos);
        }
        if self.releasable == Some(id) {
            self.releasable = None;
        }
    }

    /// First pending ticket, if any. Pure read.
    pub fn peek_head(&self) -> Option<TicketId> {
        self.pending.front().copied()
    }

    /// The tick step: mark the current head releasable, or clear the slot
    /// when the queue is empty.
    pub fn promote_head(&mut self) {
        self.releasable = self.peek_head();
    }

    pub fn releasable(&self) -> Option<TicketId> {
        self.releasable
    }

    pub fn is_releasable(&self, id: TicketId) -> bool {
        self.releasable == Some(id)
    }

    pub fn contains(&self, id: TicketId) -> bool {
        self.pending.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
