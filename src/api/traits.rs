//! Resource seams the views depend on.
//!
//! [`ApiClient`](super::ApiClient) implements every trait against the REST
//! backend; tests substitute in-memory fakes.

use async_trait::async_trait;

use super::error::ApiError;
use super::models::{
    Chat, ChatId, FollowCounts, FollowResponse, Message, MessageId, MessagePage, NewUser, Post,
    PostDraft, PostId, SearchCriteria, SearchResult, User, UserId, UserSummary,
};

#[async_trait]
pub trait UserApi: Send + Sync {
    /// Form-encoded credential check; returns the full user record.
    async fn login(&self, username: &str, password: &str) -> Result<User, ApiError>;

    async fn register(&self, user: &NewUser) -> Result<(), ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Exact username lookup. A missing user is `Client { status: 404 }`.
    async fn find_user(&self, username: &str) -> Result<User, ApiError>;

    /// Username suggestions for a prefix, optionally narrowed by gender.
    async fn autocomplete(&self, term: &str, gender: &str) -> Result<Vec<String>, ApiError>;

    async fn update_user(&self, user: &User) -> Result<(), ApiError>;

    async fn delete_user(&self, user_id: UserId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait FollowApi: Send + Sync {
    async fn follow(&self, follower: UserId, following: UserId)
        -> Result<FollowResponse, ApiError>;

    async fn unfollow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowResponse, ApiError>;

    async fn is_following(&self, follower: UserId, following: UserId) -> Result<bool, ApiError>;

    async fn followers(&self, user_id: UserId) -> Result<Vec<UserSummary>, ApiError>;

    async fn following(&self, user_id: UserId) -> Result<Vec<UserSummary>, ApiError>;

    async fn counts(&self, user_id: UserId) -> Result<FollowCounts, ApiError>;

    /// True when the follow edge exists in both directions.
    async fn can_chat(&self, user1: UserId, user2: UserId) -> Result<bool, ApiError>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Get or lazily create the chat between `user` and `other`.
    /// The backend refuses (4xx) unless the two follow each other.
    async fn chat_with(&self, user: UserId, other: UserId) -> Result<Chat, ApiError>;

    async fn messages(&self, chat: ChatId, page: u32, size: u32) -> Result<MessagePage, ApiError>;

    async fn send_message(
        &self,
        chat: ChatId,
        sender: UserId,
        content: &str,
    ) -> Result<Message, ApiError>;

    async fn mark_read(&self, chat: ChatId, user: UserId) -> Result<(), ApiError>;

    async fn delete_message(&self, message: MessageId, user: UserId) -> Result<(), ApiError>;

    async fn unread_count(&self, user: UserId) -> Result<u64, ApiError>;
}

#[async_trait]
pub trait PostApi: Send + Sync {
    async fn feed(&self) -> Result<Vec<Post>, ApiError>;

    async fn user_posts(&self, user_id: UserId) -> Result<Vec<Post>, ApiError>;

    async fn create_post(&self, draft: &PostDraft) -> Result<(), ApiError>;

    async fn update_post(&self, draft: &PostDraft) -> Result<(), ApiError>;

    async fn delete_post(&self, post_id: PostId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn quick_search(&self, query: &str, user: UserId)
        -> Result<Vec<SearchResult>, ApiError>;

    async fn recommendations(&self, user: UserId) -> Result<Vec<SearchResult>, ApiError>;

    async fn advanced_search(
        &self,
        user: UserId,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SearchResult>, ApiError>;
}

/// Everything a full client session needs, behind one object.
pub trait Backend: UserApi + FollowApi + ChatApi + PostApi + SearchApi {}

impl<T: UserApi + FollowApi + ChatApi + PostApi + SearchApi> Backend for T {}
