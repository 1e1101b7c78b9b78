//! Monotonic request tickets used to discard superseded results.
//!
//! Every invocation takes a ticket. Only the holder of the most recently
//! issued ticket may commit, so a slow earlier request can never overwrite
//! the result of a faster later one. Retiring the counter (on teardown)
//! invalidates every outstanding ticket for good.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Generation {
    latest: AtomicU64,
    retired: AtomicBool,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ticket, superseding all earlier ones. Returns `None`
    /// once retired.
    pub fn issue(&self) -> Option<Ticket> {
        if self.is_retired() {
            return None;
        }
        Some(Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.is_retired() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede every outstanding ticket without issuing a new one.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
        self.invalidate();
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }
}
