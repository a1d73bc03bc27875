use std::sync::Arc;

use thiserror::Error;

use crate::api::models::{ChatId, Message, MessageId, UserId};
use crate::api::{ApiError, ChatApi};
use crate::config::{ChatConfig, PollingConfig};
use crate::notice::Notifier;
use crate::sync::{CancelToken, PollHandle, Poller, Sequencer};
use crate::ui::chat::intent::ChatIntent;
use crate::ui::chat::reducer::ChatReducer;
use crate::ui::chat::state::{compose, ChatPhase, ChatViewState, ComposeError};
use crate::ui::mvi::ViewStore;

const SEND_FAILED: &str = "Failed to send message";
const DELETE_FAILED: &str = "Failed to delete message";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("{message}")]
    Request { message: String, source: ApiError },

    #[error("Only messages you sent can be deleted")]
    NotOwner,

    #[error("Chat window is closed")]
    Closed,
}

/// One open chat window.
///
/// Opening marks the chat read and starts polling for messages; dropping
/// or [`close`](Self::close)-ing the controller stops the poll and
/// suppresses any response still in flight.
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    store: ViewStore<ChatReducer>,
    config: ChatConfig,
    viewer: UserId,
    chat_id: ChatId,
    cancel: CancelToken,
    sequencer: Sequencer,
    notifier: Notifier,
    _poll: PollHandle,
}

impl ChatController {
    pub fn open(
        api: Arc<dyn ChatApi>,
        viewer: UserId,
        chat_id: ChatId,
        chat: &ChatConfig,
        polling: &PollingConfig,
        notifier: Notifier,
    ) -> Self {
        let store = ViewStore::default();
        store.dispatch(ChatIntent::Open { chat_id, viewer });

        let cancel = CancelToken::new();
        let sequencer = Sequencer::new();

        let read_api = Arc::clone(&api);
        tokio::spawn(async move {
            if let Err(err) = read_api.mark_read(chat_id, viewer).await {
                tracing::debug!(chat_id, error = %err, "Failed to mark chat read");
            }
        });

        let poll = {
            let api = Arc::clone(&api);
            let page_size = chat.page_size;
            let on_fail = store.clone();
            let fail_cancel = cancel.clone();
            let sink = store.clone();
            Poller::new("chat_messages", polling.chat_messages())
                .with_cancel(cancel.clone())
                .with_sequencer(sequencer.clone())
                .spawn(
                    move || {
                        let api = Arc::clone(&api);
                        let on_fail = on_fail.clone();
                        let cancel = fail_cancel.clone();
                        async move {
                            let result = api.messages(chat_id, 0, page_size).await;
                            if result.is_err() && !cancel.is_cancelled() {
                                on_fail.dispatch(ChatIntent::LoadFailed);
                            }
                            result
                        }
                    },
                    move |page| {
                        let mut messages = page.messages;
                        messages.reverse();
                        sink.dispatch(ChatIntent::MessagesLoaded { messages });
                    },
                )
        };

        tracing::info!(chat_id, "Chat opened");
        Self {
            api,
            store,
            config: chat.clone(),
            viewer,
            chat_id,
            cancel,
            sequencer,
            notifier,
            _poll: poll,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn state(&self) -> ChatViewState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<ChatReducer> {
        &self.store
    }

    pub fn is_near_limit(&self) -> bool {
        self.store
            .read(|s| s.is_near_limit(self.config.near_limit_chars))
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        self.store.dispatch(ChatIntent::DraftChanged(draft.into()));
    }

    /// Send the current draft.
    ///
    /// Rejected locally, with no request, when the draft is empty or over
    /// the limit, while still loading, or while another send is in flight.
    pub async fn send(&self) -> Result<Message, ChatError> {
        if self.cancel.is_cancelled() {
            return Err(ChatError::Closed);
        }
        let max = self.config.max_message_chars;
        let mut content = String::new();
        self.store.try_dispatch(|state| {
            match state.phase {
                ChatPhase::Loading => return Err(ComposeError::NotReady),
                ChatPhase::Sending => return Err(ComposeError::Busy),
                ChatPhase::Ready => {}
            }
            content = compose(&state.draft, max)?;
            Ok(ChatIntent::SendStarted)
        })?;

        let result = self
            .api
            .send_message(self.chat_id, self.viewer, &content)
            .await;

        if self.cancel.is_cancelled() {
            return result.map_err(|source| ChatError::Request {
                message: source.user_message(SEND_FAILED),
                source,
            });
        }

        match result {
            Ok(message) => {
                tracing::debug!(chat_id = self.chat_id, message_id = message.id, "Message sent");
                self.store
                    .dispatch(ChatIntent::SendSucceeded(message.clone()));
                Ok(message)
            }
            Err(source) => {
                let message = source.user_message(SEND_FAILED);
                tracing::warn!(chat_id = self.chat_id, error = %source, "Send failed");
                self.store.dispatch(ChatIntent::SendFailed {
                    message: message.clone(),
                });
                self.notifier.error(message.clone());
                Err(ChatError::Request { message, source })
            }
        }
    }

    /// Delete one of the viewer's own messages.
    pub async fn delete(&self, message_id: MessageId) -> Result<(), ChatError> {
        let owned = self.store.read(|s| {
            s.messages
                .iter()
                .find(|m| m.id == message_id)
                .map(|m| s.is_own(m))
        });
        if owned == Some(false) {
            return Err(ChatError::NotOwner);
        }

        match self.api.delete_message(message_id, self.viewer).await {
            Ok(()) => {
                if !self.cancel.is_cancelled() {
                    self.store.dispatch(ChatIntent::MessageDeleted(message_id));
                }
                Ok(())
            }
            Err(source) => {
                let message = source.user_message(DELETE_FAILED);
                if !self.cancel.is_cancelled() {
                    self.store.dispatch(ChatIntent::DeleteFailed {
                        message: message.clone(),
                    });
                    self.notifier.error(message.clone());
                }
                Err(ChatError::Request { message, source })
            }
        }
    }

    /// Clear the shown error once it has been reported.
    pub fn dismiss_error(&self) {
        self.store.dispatch(ChatIntent::DismissError);
    }

    /// Fetch now instead of waiting for the next tick. Shares ordering
    /// with the poll, so whichever is newer wins.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let ticket = self.sequencer.issue();
        let page = self
            .api
            .messages(self.chat_id, 0, self.config.page_size)
            .await?;
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        let mut messages = page.messages;
        messages.reverse();
        self.sequencer.apply_if_fresh(ticket, || {
            self.store
                .dispatch(ChatIntent::MessagesLoaded { messages });
        });
        Ok(())
    }

    pub fn close(&self) {
        self.cancel.cancel();
        tracing::info!(chat_id = self.chat_id, "Chat closed");
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
