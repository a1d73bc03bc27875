use thiserror::Error;

use crate::api::models::{ChatId, Message, UserId};
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    /// Waiting for the first fetch to settle.
    #[default]
    Loading,
    Ready,
    /// A send is outstanding; no second send may start.
    Sending,
}

/// The other participant, as far as the message list reveals them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub name: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatViewState {
    pub chat_id: ChatId,
    pub viewer: UserId,
    pub phase: ChatPhase,
    /// Oldest first.
    pub messages: Vec<Message>,
    pub draft: String,
    pub peer: Option<Peer>,
    pub error: Option<String>,
}

impl UiState for ChatViewState {}

impl ChatViewState {
    pub fn draft_chars(&self) -> usize {
        self.draft.chars().count()
    }

    pub fn is_near_limit(&self, near_limit: usize) -> bool {
        self.draft_chars() > near_limit
    }

    pub fn is_own(&self, message: &Message) -> bool {
        message.sender_id == self.viewer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("Message is empty")]
    Empty,

    #[error("Message is {len} characters; the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Messages are still loading")]
    NotReady,

    #[error("A message is already being sent")]
    Busy,
}

/// Check a draft against the length bound, returning the text to send.
///
/// Leading and trailing whitespace is dropped before both checks.
pub fn compose(draft: &str, max_chars: usize) -> Result<String, ComposeError> {
    let content = draft.trim();
    if content.is_empty() {
        return Err(ComposeError::Empty);
    }
    let len = content.chars().count();
    if len > max_chars {
        return Err(ComposeError::TooLong {
            len,
            max: max_chars,
        });
    }
    Ok(content.to_string())
}
