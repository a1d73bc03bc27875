use crate::api::models::{FollowCounts, Post, PostId, User};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum ProfileIntent {
    Loading,
    Loaded {
        user: User,
        posts: Vec<Post>,
        is_own: bool,
        following: bool,
        can_chat: bool,
        counts: FollowCounts,
    },
    NotFound,
    LoadFailed(String),
    /// The viewer's follow edge changed. `follower_count` is the server's
    /// figure when it sent one.
    FollowChanged {
        following: bool,
        follower_count: Option<u64>,
    },
    CanChat(bool),
    PostRemoved(PostId),
}

impl Intent for ProfileIntent {}
