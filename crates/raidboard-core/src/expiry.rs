//! Cancellable one-shot expiry timers keyed by shape id.
//!
//! Timers are polled rather than driven by callbacks: the owner asks for the
//! ids whose deadline has passed and removes them itself. Cancelling a timer
//! is just dropping its entry, so a removed shape can never be acted on by a
//! stale timer.

use crate::clock::Timestamp;
use crate::shapes::ShapeId;
use std::time::Duration;

/// A scheduled removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingExpiry {
    pub id: ShapeId,
    pub due: Timestamp,
}

/// Pending expiries, at most one per id.
#[derive(Debug, Clone, Default)]
pub struct ExpiryQueue {
    pending: Vec<PendingExpiry>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `id` to expire `delay` after `now`.
    ///
    /// Rescheduling an id replaces its previous deadline.
    pub fn schedule(&mut self, id: ShapeId, now: Timestamp, delay: Duration) {
        let due = now.after(delay);
        match self.pending.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.due = due,
            None => self.pending.push(PendingExpiry { id, due }),
        }
    }

    /// Cancel the timer for `id`. Returns true if one was pending.
    pub fn cancel(&mut self, id: ShapeId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the ids due at `now`, earliest deadline first.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<ShapeId> {
        let mut due: Vec<PendingExpiry> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| p.due);
        due.into_iter().map(|p| p.id).collect()
    }

    /// Earliest pending deadline (for hosts that sleep until the next timer).
    pub fn next_due(&self) -> Option<Timestamp> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingExpiry> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
