use crate::api::models::Message;
use crate::ui::chat::intent::ChatIntent;
use crate::ui::chat::state::{ChatPhase, ChatViewState, Peer};
use crate::ui::mvi::Reducer;

pub struct ChatReducer;

impl Reducer for ChatReducer {
    type State = ChatViewState;
    type Intent = ChatIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ChatIntent::Open { chat_id, viewer } => ChatViewState {
                chat_id,
                viewer,
                ..Default::default()
            },
            ChatIntent::MessagesLoaded { messages } => {
                let peer = find_peer(&messages, &state).or(state.peer);
                let phase = match state.phase {
                    ChatPhase::Loading => ChatPhase::Ready,
                    other => other,
                };
                ChatViewState {
                    phase,
                    messages,
                    peer,
                    ..state
                }
            }
            ChatIntent::LoadFailed => match state.phase {
                ChatPhase::Loading => ChatViewState {
                    phase: ChatPhase::Ready,
                    ..state
                },
                _ => state,
            },
            ChatIntent::DraftChanged(draft) => ChatViewState { draft, ..state },
            ChatIntent::SendStarted => match state.phase {
                ChatPhase::Ready => ChatViewState {
                    phase: ChatPhase::Sending,
                    error: None,
                    ..state
                },
                _ => state,
            },
            ChatIntent::SendSucceeded(message) => match state.phase {
                ChatPhase::Sending => {
                    let mut messages = state.messages;
                    // A poll may already have delivered it.
                    if !messages.iter().any(|m| m.id == message.id) {
                        messages.push(message);
                    }
                    ChatViewState {
                        phase: ChatPhase::Ready,
                        messages,
                        draft: String::new(),
                        ..state
                    }
                }
                _ => state,
            },
            ChatIntent::SendFailed { message } => match state.phase {
                ChatPhase::Sending => ChatViewState {
                    phase: ChatPhase::Ready,
                    error: Some(message),
                    ..state
                },
                _ => state,
            },
            ChatIntent::MessageDeleted(id) => match state.phase {
                ChatPhase::Ready => {
                    let mut messages = state.messages;
                    messages.retain(|m| m.id != id);
                    ChatViewState { messages, ..state }
                }
                _ => state,
            },
            ChatIntent::DeleteFailed { message } => ChatViewState {
                error: Some(message),
                ..state
            },
            ChatIntent::DismissError => ChatViewState {
                error: None,
                ..state
            },
        }
    }
}

fn find_peer(messages: &[Message], state: &ChatViewState) -> Option<Peer> {
    messages
        .iter()
        .find(|m| !state.is_own(m))
        .map(|m| Peer {
            name: m.sender_name.clone(),
            profile_picture: m.sender_profile_picture.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, sender: i64, content: &str) -> Message {
        Message {
            id,
            sender_id: sender,
            sender_name: format!("user{sender}"),
            sender_profile_picture: None,
            content: content.into(),
            created_on: None,
            is_read: false,
        }
    }

    fn reduce_all(intents: Vec<ChatIntent>) -> ChatViewState {
        intents
            .into_iter()
            .fold(ChatViewState::default(), ChatReducer::reduce)
    }

    fn ready() -> ChatViewState {
        reduce_all(vec![
            ChatIntent::Open {
                chat_id: 5,
                viewer: 1,
            },
            ChatIntent::MessagesLoaded {
                messages: vec![message(1, 2, "hi"), message(2, 1, "hey")],
            },
        ])
    }

    #[test]
    fn first_load_moves_to_ready_and_finds_peer() {
        let state = ready();
        assert_eq!(state.phase, ChatPhase::Ready);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.peer.as_ref().map(|p| p.name.as_str()), Some("user2"));
    }

    #[test]
    fn failed_first_load_still_leaves_loading() {
        let state = reduce_all(vec![
            ChatIntent::Open {
                chat_id: 5,
                viewer: 1,
            },
            ChatIntent::LoadFailed,
        ]);
        assert_eq!(state.phase, ChatPhase::Ready);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn send_round_trip_appends_and_clears_draft() {
        let mut state = ready();
        state = ChatReducer::reduce(state, ChatIntent::DraftChanged("yo".into()));
        state = ChatReducer::reduce(state, ChatIntent::SendStarted);
        assert_eq!(state.phase, ChatPhase::Sending);

        state = ChatReducer::reduce(state, ChatIntent::SendSucceeded(message(3, 1, "yo")));
        assert_eq!(state.phase, ChatPhase::Ready);
        assert_eq!(state.messages.last().map(|m| m.id), Some(3));
        assert!(state.draft.is_empty());
    }

    #[test]
    fn send_does_not_duplicate_polled_message() {
        let mut state = ChatReducer::reduce(ready(), ChatIntent::SendStarted);
        state = ChatReducer::reduce(
            state,
            ChatIntent::MessagesLoaded {
                messages: vec![message(1, 2, "hi"), message(2, 1, "hey"), message(3, 1, "yo")],
            },
        );
        assert_eq!(state.phase, ChatPhase::Sending);
        state = ChatReducer::reduce(state, ChatIntent::SendSucceeded(message(3, 1, "yo")));
        assert_eq!(state.messages.len(), 3);
    }

    #[test]
    fn send_failure_keeps_draft() {
        let mut state = ChatReducer::reduce(ready(), ChatIntent::DraftChanged("keep me".into()));
        state = ChatReducer::reduce(state, ChatIntent::SendStarted);
        state = ChatReducer::reduce(
            state,
            ChatIntent::SendFailed {
                message: "Failed to send message".into(),
            },
        );
        assert_eq!(state.phase, ChatPhase::Ready);
        assert_eq!(state.draft, "keep me");
        assert_eq!(state.error.as_deref(), Some("Failed to send message"));
    }

    #[test]
    fn send_cannot_start_while_loading() {
        let state = reduce_all(vec![
            ChatIntent::Open {
                chat_id: 5,
                viewer: 1,
            },
            ChatIntent::SendStarted,
        ]);
        assert_eq!(state.phase, ChatPhase::Loading);
    }

    #[test]
    fn delete_only_applies_when_ready() {
        let state = ChatReducer::reduce(ready(), ChatIntent::MessageDeleted(1));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.phase, ChatPhase::Ready);

        let sending = ChatReducer::reduce(ready(), ChatIntent::SendStarted);
        let state = ChatReducer::reduce(sending, ChatIntent::MessageDeleted(1));
        assert_eq!(state.messages.len(), 2);
    }
}
