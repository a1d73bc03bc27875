use crate::api::models::{FollowCounts, Post, User};
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProfilePhase {
    #[default]
    Loading,
    Ready,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileState {
    pub phase: ProfilePhase,
    pub user: Option<User>,
    /// Newest first.
    pub posts: Vec<Post>,
    /// Viewing one's own profile: no follow or message actions.
    pub is_own: bool,
    pub following: bool,
    pub can_chat: bool,
    pub counts: FollowCounts,
}

impl UiState for ProfileState {}

impl ProfileState {
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_default()
    }
}
