use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    InFlight,
}

/// Two-state idle/in-flight gate for one mutation target.
///
/// Acquisition is a single compare-exchange, so concurrent callers are
/// rejected deterministically whatever the scheduler does.
#[derive(Clone, Default)]
pub struct MutationGuard {
    in_flight: Arc<AtomicBool>,
}

impl MutationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` if a mutation is already outstanding.
    pub fn try_acquire(&self) -> Option<MutationPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| MutationPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn state(&self) -> GuardState {
        if self.in_flight.load(Ordering::Acquire) {
            GuardState::InFlight
        } else {
            GuardState::Idle
        }
    }
}

/// Held for the duration of one mutation; releases the guard on drop,
/// including when the owning future is dropped mid-request.
pub struct MutationPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for MutationPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
