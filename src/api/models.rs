//! Wire types for the REST backend.
//!
//! The user and post endpoints speak snake_case; the follow, chat and
//! search endpoints speak camelCase. Each type mirrors the endpoint it
//! comes from.

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;
pub type ChatId = i64;
pub type MessageId = i64;

/// A full user record as returned by `/login`, `/users` and `/users/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// Registration payload for `/createuser`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub gender: String,
    pub password: String,
    pub college: String,
    pub semester: String,
    pub batch: String,
    pub profile_picture: Option<String>,
}

/// Compact user entry from the follower/following lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub is_following: bool,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_on: Option<String>,
}

/// The single media attachment a post may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Image(String),
    Video(String),
}

impl Media {
    pub fn url(&self) -> &str {
        match self {
            Media::Image(url) | Media::Video(url) => url,
        }
    }
}

impl Post {
    /// Image wins if the backend ever returns both.
    pub fn media(&self) -> Option<Media> {
        match (&self.image, &self.video) {
            (Some(url), _) if !url.is_empty() => Some(Media::Image(url.clone())),
            (_, Some(url)) if !url.is_empty() => Some(Media::Video(url.clone())),
            _ => None,
        }
    }

    pub fn owner_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

/// Payload for `/createpost` and `/updatepost`.
///
/// `post_id` is omitted on create. At most one of `image`/`video` is set;
/// use [`PostDraft::with_media`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    pub content: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub user: User,
}

impl PostDraft {
    pub fn new(user: User, content: impl Into<String>) -> Self {
        Self {
            post_id: None,
            content: content.into(),
            image: None,
            video: None,
            user,
        }
    }

    pub fn with_media(mut self, media: Option<Media>) -> Self {
        match media {
            Some(Media::Image(url)) => {
                self.image = Some(url);
                self.video = None;
            }
            Some(Media::Video(url)) => {
                self.video = Some(url);
                self.image = None;
            }
            None => {
                self.image = None;
                self.video = None;
            }
        }
        self
    }

    /// Draft for editing an existing post, keeping its media.
    pub fn for_update(post: &Post, user: User, content: impl Into<String>) -> Self {
        Self {
            post_id: Some(post.post_id),
            content: content.into(),
            image: post.image.clone(),
            video: post.video.clone(),
            user: post.user.clone().unwrap_or(user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: UserId,
    pub following_id: UserId,
}

/// Response to follow/unfollow. `success: false` is a failure even on 2xx.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCheck {
    pub is_following: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanChat {
    pub can_chat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_profile_picture: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// One page of chat history, newest first on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub sender_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub struct UnreadCount {
    #[serde(default)]
    pub count: u64,
}

/// A user card from the discover endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub match_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub query: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub college: String,
    pub semester: String,
    pub batch: String,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct AdvancedSearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
