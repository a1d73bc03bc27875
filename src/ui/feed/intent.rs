use std::collections::HashSet;

use crate::api::models::{Post, PostId, UserId};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum FeedIntent {
    Loading,
    Loaded(Vec<Post>),
    /// Feed fetch failed; the list is shown empty.
    LoadFailed,
    FollowingLoaded(HashSet<UserId>),
    Submitting,
    Submitted,
    Edit(PostId),
    CancelEdit,
    PostRemoved(PostId),
}

impl Intent for FeedIntent {}
