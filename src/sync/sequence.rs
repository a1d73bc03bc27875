use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Request number handed out by a [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Orders racing responses for one resource.
///
/// Every request takes a ticket before it goes out. A response is applied
/// only if its ticket is newer than the last one applied, so a slow early
/// response can never overwrite a fast later one.
#[derive(Clone, Default)]
pub struct Sequencer {
    issued: Arc<AtomicU64>,
    applied: Arc<Mutex<u64>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run `apply` if `ticket` is fresh. The check and the apply happen
    /// under one lock, so two fresh results cannot interleave.
    ///
    /// Returns whether `apply` ran.
    pub fn apply_if_fresh(&self, ticket: Ticket, apply: impl FnOnce()) -> bool {
        let mut last = self.applied.lock();
        if ticket.0 <= *last {
            return false;
        }
        apply();
        *last = ticket.0;
        true
    }

    /// Mark everything issued so far as stale.
    pub fn invalidate(&self) {
        let current = self.issued.load(Ordering::SeqCst);
        let mut last = self.applied.lock();
        *last = (*last).max(current);
    }

    pub fn last_applied(&self) -> u64 {
        *self.applied.lock()
    }
}
