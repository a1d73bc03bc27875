//! REST implementations of the resource traits.

use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{
    AdvancedSearchResponse, CanChat, Chat, ChatId, FollowCheck, FollowCounts, FollowRequest,
    FollowResponse, Message, MessageId, MessagePage, NewUser, Post, PostDraft, PostId,
    SearchCriteria, SearchResult, SendMessage, UnreadCount, User, UserId, UserSummary,
};
use super::traits::{ChatApi, FollowApi, PostApi, SearchApi, UserApi};

mod routes {
    pub const CREATE_USER: &str = "/createuser";
    pub const LOGIN: &str = "/login";
    pub const USERS: &str = "/users";
    pub const SEARCH_USER: &str = "/users/search";
    pub const AUTOCOMPLETE: &str = "/users/autocomplete";
    pub const UPDATE_USER: &str = "/updateuser";
    pub const DELETE_USER: &str = "/deleteuser";

    pub const CREATE_POST: &str = "/createpost";
    pub const FEED: &str = "/feed";
    pub const UPDATE_POST: &str = "/updatepost";
    pub const DELETE_POST: &str = "/deletepost";
    pub const USER_POSTS: &str = "/posts/user";

    pub const FOLLOW: &str = "/api/follow";
    pub const FOLLOW_CHECK: &str = "/api/follow/check";
    pub const FOLLOWERS: &str = "/api/follow/followers";
    pub const FOLLOWING: &str = "/api/follow/following";
    pub const FOLLOW_COUNTS: &str = "/api/follow/counts";

    pub const CHATS: &str = "/api/chats";
    pub const CHAT_WITH: &str = "/api/chats/with";
    pub const CHAT_MESSAGES: &str = "/api/chats/messages";
    pub const UNREAD_COUNT: &str = "/api/chats/unread-count";
    pub const CAN_CHAT: &str = "/api/chats/can-chat";

    pub const QUICK_SEARCH: &str = "/api/search/quick";
    pub const RECOMMENDATIONS: &str = "/api/search/recommendations";
    pub const ADVANCED_SEARCH: &str = "/api/search/advanced";
}

/// `{base}/{segment}` with the segment percent-encoded.
fn path(base: &str, segment: impl ToString) -> String {
    format!("{}/{}", base, urlencoding::encode(&segment.to_string()))
}

#[async_trait]
impl UserApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        self.send_form(
            routes::LOGIN,
            &[("username", username), ("password", password)],
        )
        .await
    }

    async fn register(&self, user: &NewUser) -> Result<(), ApiError> {
        self.send_unit(Method::POST, routes::CREATE_USER, &[], Some(user))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get(routes::USERS, &[]).await
    }

    async fn find_user(&self, username: &str) -> Result<User, ApiError> {
        self.get(&path(routes::SEARCH_USER, username), &[]).await
    }

    async fn autocomplete(&self, term: &str, gender: &str) -> Result<Vec<String>, ApiError> {
        self.get(
            &path(routes::AUTOCOMPLETE, term),
            &[("gender", gender.to_string())],
        )
        .await
    }

    async fn update_user(&self, user: &User) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, routes::UPDATE_USER, &[], Some(user))
            .await
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &path(routes::DELETE_USER, user_id), &[], None)
            .await
    }
}

#[async_trait]
impl FollowApi for ApiClient {
    async fn follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowResponse, ApiError> {
        let body = FollowRequest {
            follower_id: follower,
            following_id: following,
        };
        self.send(Method::POST, routes::FOLLOW, &[], &body).await
    }

    async fn unfollow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowResponse, ApiError> {
        let body = FollowRequest {
            follower_id: follower,
            following_id: following,
        };
        self.send(Method::DELETE, routes::FOLLOW, &[], &body).await
    }

    async fn is_following(&self, follower: UserId, following: UserId) -> Result<bool, ApiError> {
        let check: FollowCheck = self
            .get(
                routes::FOLLOW_CHECK,
                &[
                    ("followerId", follower.to_string()),
                    ("followingId", following.to_string()),
                ],
            )
            .await?;
        Ok(check.is_following)
    }

    async fn followers(&self, user_id: UserId) -> Result<Vec<UserSummary>, ApiError> {
        self.get(&path(routes::FOLLOWERS, user_id), &[]).await
    }

    async fn following(&self, user_id: UserId) -> Result<Vec<UserSummary>, ApiError> {
        self.get(&path(routes::FOLLOWING, user_id), &[]).await
    }

    async fn counts(&self, user_id: UserId) -> Result<FollowCounts, ApiError> {
        self.get(&path(routes::FOLLOW_COUNTS, user_id), &[]).await
    }

    async fn can_chat(&self, user1: UserId, user2: UserId) -> Result<bool, ApiError> {
        let check: CanChat = self
            .get(
                routes::CAN_CHAT,
                &[("user1Id", user1.to_string()), ("user2Id", user2.to_string())],
            )
            .await?;
        Ok(check.can_chat)
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn chat_with(&self, user: UserId, other: UserId) -> Result<Chat, ApiError> {
        self.get(
            &path(routes::CHAT_WITH, other),
            &[("userId", user.to_string())],
        )
        .await
    }

    async fn messages(&self, chat: ChatId, page: u32, size: u32) -> Result<MessagePage, ApiError> {
        self.get(
            &format!("{}/messages", path(routes::CHATS, chat)),
            &[("page", page.to_string()), ("size", size.to_string())],
        )
        .await
    }

    async fn send_message(
        &self,
        chat: ChatId,
        sender: UserId,
        content: &str,
    ) -> Result<Message, ApiError> {
        let body = SendMessage {
            sender_id: sender,
            content: content.to_string(),
        };
        self.send(
            Method::POST,
            &format!("{}/messages", path(routes::CHATS, chat)),
            &[],
            &body,
        )
        .await
    }

    async fn mark_read(&self, chat: ChatId, user: UserId) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::PUT,
            &format!("{}/read", path(routes::CHATS, chat)),
            &[("userId", user.to_string())],
            None,
        )
        .await
    }

    async fn delete_message(&self, message: MessageId, user: UserId) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::DELETE,
            &path(routes::CHAT_MESSAGES, message),
            &[("userId", user.to_string())],
            None,
        )
        .await
    }

    async fn unread_count(&self, user: UserId) -> Result<u64, ApiError> {
        let unread: UnreadCount = self
            .get(routes::UNREAD_COUNT, &[("userId", user.to_string())])
            .await?;
        Ok(unread.count)
    }
}

#[async_trait]
impl PostApi for ApiClient {
    async fn feed(&self) -> Result<Vec<Post>, ApiError> {
        self.get(routes::FEED, &[]).await
    }

    async fn user_posts(&self, user_id: UserId) -> Result<Vec<Post>, ApiError> {
        self.get(&path(routes::USER_POSTS, user_id), &[]).await
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<(), ApiError> {
        self.send_unit(Method::POST, routes::CREATE_POST, &[], Some(draft))
            .await
    }

    async fn update_post(&self, draft: &PostDraft) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, routes::UPDATE_POST, &[], Some(draft))
            .await
    }

    async fn delete_post(&self, post_id: PostId) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &path(routes::DELETE_POST, post_id), &[], None)
            .await
    }
}

#[async_trait]
impl SearchApi for ApiClient {
    async fn quick_search(
        &self,
        query: &str,
        user: UserId,
    ) -> Result<Vec<SearchResult>, ApiError> {
        self.get(
            routes::QUICK_SEARCH,
            &[("query", query.to_string()), ("userId", user.to_string())],
        )
        .await
    }

    async fn recommendations(&self, user: UserId) -> Result<Vec<SearchResult>, ApiError> {
        self.get(routes::RECOMMENDATIONS, &[("userId", user.to_string())])
            .await
    }

    async fn advanced_search(
        &self,
        user: UserId,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let response: AdvancedSearchResponse = self
            .send(
                Method::POST,
                routes::ADVANCED_SEARCH,
                &[("userId", user.to_string())],
                criteria,
            )
            .await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(path(routes::AUTOCOMPLETE, "a b/c"), "/users/autocomplete/a%20b%2Fc");
        assert_eq!(path(routes::DELETE_POST, 42), "/deletepost/42");
    }
}
