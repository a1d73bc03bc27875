//! Transient user notices ("toasts").
//!
//! Views raise notices through a shared [`Notifier`]; whatever renders them
//! subscribes. A notice nobody is listening for is dropped.

use std::time::Duration;

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeKind {
    /// How long the notice stays up by default.
    pub fn default_duration(self) -> Duration {
        Duration::from_millis(match self {
            NoticeKind::Success | NoticeKind::Info => 3000,
            NoticeKind::Error => 4000,
            NoticeKind::Warning => 3500,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
            NoticeKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
    next_id: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            next_id: Default::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn show(&self, kind: NoticeKind, message: impl Into<String>, duration: Duration) {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let notice = Notice {
            id,
            kind,
            message: message.into(),
            duration,
        };
        tracing::debug!(kind = kind.label(), message = %notice.message, "Notice");
        let _ = self.tx.send(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(NoticeKind::Success, message, NoticeKind::Success.default_duration());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(NoticeKind::Error, message, NoticeKind::Error.default_duration());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(NoticeKind::Warning, message, NoticeKind::Warning.default_duration());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(NoticeKind::Info, message, NoticeKind::Info.default_duration());
    }
}
