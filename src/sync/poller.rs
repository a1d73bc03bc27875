use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::ApiError;
use crate::sync::cancel::CancelToken;
use crate::sync::sequence::Sequencer;

/// Keeps a view's copy of one remote resource approximately fresh.
///
/// Fetches once immediately, then every `interval`. Fetches are spawned
/// independently so a slow response never delays the schedule; the
/// [`Sequencer`] discards any response older than the last one applied.
/// Failed polls are logged and dropped.
pub struct Poller {
    name: &'static str,
    interval: Duration,
    cancel: CancelToken,
    sequencer: Sequencer,
}

impl Poller {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            cancel: CancelToken::new(),
            sequencer: Sequencer::new(),
        }
    }

    /// Tie the poller to an existing teardown token (e.g. the owning view's).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Share the ordering with other fetches of the same resource, such as
    /// an explicit refresh issued by the view.
    pub fn with_sequencer(mut self, sequencer: Sequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn spawn<T, F, Fut, S>(self, fetch: F, sink: S) -> PollHandle
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let Poller {
            name,
            interval,
            cancel,
            sequencer,
        } = self;
        let fetch = Arc::new(fetch);
        let sink = Arc::new(sink);
        let loop_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let ticket = sequencer.issue();
                let fetch = Arc::clone(&fetch);
                let sink = Arc::clone(&sink);
                let cancel = loop_cancel.clone();
                let sequencer = sequencer.clone();

                tokio::spawn(async move {
                    let result = fetch().await;
                    if cancel.is_cancelled() {
                        tracing::trace!(poll = name, seq = ticket.value(), "Dropping result after teardown");
                        return;
                    }
                    match result {
                        Ok(value) => {
                            if !sequencer.apply_if_fresh(ticket, || sink(value)) {
                                tracing::debug!(poll = name, seq = ticket.value(), "Discarding stale poll result");
                            }
                        }
                        Err(err) => {
                            tracing::debug!(poll = name, seq = ticket.value(), error = %err, "Poll failed");
                        }
                    }
                });
            }

            tracing::trace!(poll = name, "Poller stopped");
        });

        PollHandle { cancel, task }
    }
}

/// Owning handle for a running poller. Dropping it stops the schedule.
pub struct PollHandle {
    cancel: CancelToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop scheduling new polls. Requests already on the wire finish but
    /// their results are not applied.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
