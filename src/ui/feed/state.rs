use std::collections::HashSet;

use crate::api::models::{Post, PostId, UserId};
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedState {
    pub loading: bool,
    /// Newest first.
    pub posts: Vec<Post>,
    /// Authors the viewer follows, for the "following" marker.
    pub following: HashSet<UserId>,
    /// Post currently open in the editor.
    pub editing: Option<PostId>,
    /// A create or update is outstanding.
    pub submitting: bool,
}

impl UiState for FeedState {}

impl FeedState {
    pub fn is_following_author(&self, post: &Post) -> bool {
        post.owner_id()
            .is_some_and(|id| self.following.contains(&id))
    }
}
