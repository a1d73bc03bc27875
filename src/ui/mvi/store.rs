use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::reducer::Reducer;

/// Shared, thread-safe owner of one view's state.
///
/// Poll sinks, request completions and user input all dispatch through the
/// same store, so every transition goes through the reducer under one lock.
pub struct ViewStore<R: Reducer> {
    state: Arc<Mutex<R::State>>,
    revision: Arc<watch::Sender<u64>>,
    _reducer: PhantomData<fn() -> R>,
}

impl<R: Reducer> Clone for ViewStore<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            revision: Arc::clone(&self.revision),
            _reducer: PhantomData,
        }
    }
}

impl<R: Reducer> Default for ViewStore<R> {
    fn default() -> Self {
        Self::new(R::State::default())
    }
}

impl<R: Reducer> ViewStore<R> {
    pub fn new(initial: R::State) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(initial)),
            revision: Arc::new(revision),
            _reducer: PhantomData,
        }
    }

    pub fn dispatch(&self, intent: R::Intent) {
        let changed = {
            let mut state = self.state.lock();
            let before = state.clone();
            *state = R::reduce(std::mem::take(&mut *state), intent);
            *state != before
        };
        if changed {
            self.revision.send_modify(|rev| *rev += 1);
        }
    }

    /// Decide on an intent from the current state and apply it without
    /// releasing the lock in between. `decide` returning `Err` leaves the
    /// state untouched.
    pub fn try_dispatch<E>(
        &self,
        decide: impl FnOnce(&R::State) -> Result<R::Intent, E>,
    ) -> Result<(), E> {
        {
            let mut state = self.state.lock();
            let intent = decide(&state)?;
            *state = R::reduce(std::mem::take(&mut *state), intent);
        }
        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    pub fn state(&self) -> R::State {
        self.state.lock().clone()
    }

    /// Read a projection without cloning the whole state.
    pub fn read<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self.state.lock())
    }

    /// Notified after every transition that changed the state.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
