use crate::api::models::{ChatId, Message, MessageId, UserId};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum ChatIntent {
    Open { chat_id: ChatId, viewer: UserId },
    /// A fetch settled. Messages are oldest first.
    MessagesLoaded { messages: Vec<Message> },
    /// A fetch failed. Only matters while still loading.
    LoadFailed,
    DraftChanged(String),
    SendStarted,
    SendSucceeded(Message),
    SendFailed { message: String },
    MessageDeleted(MessageId),
    DeleteFailed { message: String },
    DismissError,
}

impl Intent for ChatIntent {}
