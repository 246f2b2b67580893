//! Per-entity request fencing
//!
//! Each request takes a ticket from a single monotonic counter before it goes
//! out. When its response comes back it may only be applied if no newer
//! ticket for the same entity has been applied already.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> &str { &self.key }
    pub fn seq(&self) -> u64 { self.seq }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: AtomicU64,
    applied: DashMap<String, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self { Self::default() }

    pub fn issue(&self, key: impl Into<String>) -> Ticket {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Ticket { key: key.into(), seq }
    }

    /// Marks the ticket applied and returns true, or returns false when a newer
    /// ticket for the same key already went through.
    ///
    /// Callers hold the write lock of the state they are about to replace.
    pub fn commit(&self, ticket: &Ticket) -> bool {
        let mut applied = self.applied.entry(ticket.key.clone()).or_insert(0);
        if ticket.seq > *applied {
            *applied = ticket.seq;
            true
        } else {
            tracing::debug!(key = %ticket.key, seq = ticket.seq, newest = *applied, "discarding stale response");
            false
        }
    }
}
