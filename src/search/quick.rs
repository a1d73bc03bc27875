use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::ApiError;
use crate::config::SearchConfig;
use crate::sync::{CancelToken, Sequencer};

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions<T> {
    pub query: String,
    pub items: Vec<T>,
    pub open: bool,
}

impl<T> Default for Suggestions<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            items: Vec::new(),
            open: false,
        }
    }
}

enum Event {
    Query(String),
    Reset,
}

/// Debounced server-side search behind a text box.
///
/// Every keystroke restarts a quiet-period timer; only when it expires is a
/// request issued, so a burst of typing costs one round trip. Input shorter
/// than the minimum clears the suggestions without a request. Responses are
/// sequenced, so a slow answer for an older query never replaces a newer one.
pub struct QuickSearch<T> {
    state: Arc<Mutex<Suggestions<T>>>,
    events: mpsc::UnboundedSender<Event>,
    sequencer: Sequencer,
    cancel: CancelToken,
    revision: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl<T> QuickSearch<T>
where
    T: Clone + Send + 'static,
{
    pub fn spawn<F, Fut>(config: &SearchConfig, fetch: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        Self::spawn_with(config.debounce(), config.min_query_chars, fetch)
    }

    pub fn spawn_with<F, Fut>(debounce: Duration, min_chars: usize, fetch: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        let state = Arc::new(Mutex::new(Suggestions::default()));
        let (events, rx) = mpsc::unbounded_channel();
        let sequencer = Sequencer::new();
        let cancel = CancelToken::new();
        let (bump, revision) = watch::channel(0u64);

        let worker = Worker {
            state: Arc::clone(&state),
            sequencer: sequencer.clone(),
            cancel: cancel.clone(),
            bump: Arc::new(bump),
            fetch: Arc::new(fetch),
            debounce,
            min_chars,
        };
        let task = tokio::spawn(worker.run(rx));

        Self {
            state,
            events,
            sequencer,
            cancel,
            revision,
            task,
        }
    }

    /// Record the current contents of the text box.
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.lock().query = query.clone();
        let _ = self.events.send(Event::Query(query));
    }

    pub fn snapshot(&self) -> Suggestions<T> {
        self.state.lock().clone()
    }

    /// Pick a suggestion. Clears the query and closes the list; the returned
    /// item is the navigation target.
    pub fn select(&self, index: usize) -> Option<T> {
        let picked = self.state.lock().items.get(index).cloned();
        if picked.is_some() {
            self.clear();
        }
        picked
    }

    /// Escape: close the list and clear the query.
    pub fn escape(&self) {
        self.clear();
    }

    /// Focus left the box: close the list, keep what was typed.
    pub fn blur(&self) {
        self.state.lock().open = false;
    }

    /// Wait until the suggestions change, or the search is torn down.
    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    fn clear(&self) {
        self.sequencer.invalidate();
        *self.state.lock() = Suggestions::default();
        let _ = self.events.send(Event::Reset);
    }
}

impl<T> Drop for QuickSearch<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

struct Worker<T, F> {
    state: Arc<Mutex<Suggestions<T>>>,
    sequencer: Sequencer,
    cancel: CancelToken,
    bump: Arc<watch::Sender<u64>>,
    fetch: Arc<F>,
    debounce: Duration,
    min_chars: usize,
}

impl<T, F, Fut> Worker<T, F>
where
    T: Clone + Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
{
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Event>) {
        let mut pending: Option<String> = None;
        let mut deadline = Instant::now();

        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = rx.recv() => event,
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    if let Some(query) = pending.take() {
                        self.issue(query);
                    }
                    continue;
                }
            };

            match event {
                Some(Event::Query(query)) => {
                    if query.chars().count() < self.min_chars {
                        pending = None;
                        self.sequencer.invalidate();
                        let mut state = self.state.lock();
                        state.items.clear();
                        state.open = false;
                        drop(state);
                        self.bump.send_modify(|rev| *rev += 1);
                    } else {
                        pending = Some(query);
                        deadline = Instant::now() + self.debounce;
                    }
                }
                Some(Event::Reset) => pending = None,
                None => break,
            }
        }
    }

    fn issue(&self, query: String) {
        let ticket = self.sequencer.issue();
        let fetch = Arc::clone(&self.fetch);
        let state = Arc::clone(&self.state);
        let sequencer = self.sequencer.clone();
        let cancel = self.cancel.clone();
        let bump = Arc::clone(&self.bump);

        tracing::debug!(seq = ticket.value(), query = %query, "Quick search");
        tokio::spawn(async move {
            let result = fetch(query).await;
            if cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(items) => {
                    let applied = sequencer.apply_if_fresh(ticket, || {
                        let mut state = state.lock();
                        state.open = !items.is_empty();
                        state.items = items;
                    });
                    if applied {
                        bump.send_modify(|rev| *rev += 1);
                    } else {
                        tracing::debug!(seq = ticket.value(), "Discarding stale search result");
                    }
                }
                Err(err) => {
                    tracing::debug!(seq = ticket.value(), error = %err, "Quick search failed");
                }
            }
        });
    }
}
