//! Chat list: the people the viewer follows, kept fresh by polling, with a
//! local filter box. Picking someone resolves (or creates) the chat.

use std::sync::Arc;

use crate::api::models::{ChatId, UserId, UserSummary};
use crate::api::{ChatApi, FollowApi};
use crate::config::PollingConfig;
use crate::notice::Notifier;
use crate::search::filter;
use crate::sync::{CancelToken, PollHandle, Poller};
use crate::ui::mvi::{Intent, Reducer, UiState, ViewStore};
use crate::ui::ViewError;

const MUST_FOLLOW: &str = "You must follow this user to message them";
const START_FAILED: &str = "Unable to start chat. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatListState {
    pub loading: bool,
    pub people: Vec<UserSummary>,
    pub query: String,
}

impl Default for ChatListState {
    fn default() -> Self {
        Self {
            loading: true,
            people: Vec::new(),
            query: String::new(),
        }
    }
}

impl UiState for ChatListState {}

impl ChatListState {
    /// People matching the filter box, in server order.
    pub fn visible(&self) -> Vec<UserSummary> {
        filter(&self.people, &self.query)
    }
}

#[derive(Debug, Clone)]
pub enum ChatListIntent {
    Loaded(Vec<UserSummary>),
    LoadFailed,
    QueryChanged(String),
}

impl Intent for ChatListIntent {}

pub struct ChatListReducer;

impl Reducer for ChatListReducer {
    type State = ChatListState;
    type Intent = ChatListIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ChatListIntent::Loaded(people) => ChatListState {
                loading: false,
                people,
                ..state
            },
            ChatListIntent::LoadFailed => ChatListState {
                loading: false,
                ..state
            },
            ChatListIntent::QueryChanged(query) => ChatListState { query, ..state },
        }
    }
}

pub struct ChatListController<B> {
    api: Arc<B>,
    viewer: UserId,
    store: ViewStore<ChatListReducer>,
    notifier: Notifier,
    poll: PollHandle,
}

impl<B: FollowApi + ChatApi + 'static> ChatListController<B> {
    pub fn open(api: Arc<B>, viewer: UserId, polling: &PollingConfig, notifier: Notifier) -> Self {
        let store: ViewStore<ChatListReducer> = ViewStore::default();
        let cancel = CancelToken::new();

        let fetch_api = Arc::clone(&api);
        let on_fail = store.clone();
        let fail_cancel = cancel.clone();
        let sink = store.clone();
        let poll = Poller::new("following", polling.following())
            .with_cancel(cancel)
            .spawn(
                move || {
                    let api = Arc::clone(&fetch_api);
                    let on_fail = on_fail.clone();
                    let cancel = fail_cancel.clone();
                    async move {
                        let result = api.following(viewer).await;
                        if result.is_err() && !cancel.is_cancelled() {
                            on_fail.dispatch(ChatListIntent::LoadFailed);
                        }
                        result
                    }
                },
                move |people| sink.dispatch(ChatListIntent::Loaded(people)),
            );

        Self {
            api,
            viewer,
            store,
            notifier,
            poll,
        }
    }

    pub fn state(&self) -> ChatListState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<ChatListReducer> {
        &self.store
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.store.dispatch(ChatListIntent::QueryChanged(query.into()));
    }

    /// Resolve the chat with `other`. The backend refuses with 400 unless
    /// the two follow each other.
    pub async fn open_chat(&self, other: UserId) -> Result<ChatId, ViewError> {
        match self.api.chat_with(self.viewer, other).await {
            Ok(chat) => Ok(chat.id),
            Err(source) => {
                let message = if source.status() == Some(400) {
                    MUST_FOLLOW.to_string()
                } else if source.is_network() {
                    source.user_message(START_FAILED)
                } else {
                    START_FAILED.to_string()
                };
                tracing::warn!(other_user = other, error = %source, "Could not open chat");
                self.notifier.error(message.clone());
                Err(ViewError::Request { message, source })
            }
        }
    }

    pub fn close(&self) {
        self.poll.cancel();
    }
}
