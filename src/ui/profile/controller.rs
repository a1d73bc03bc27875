use std::sync::Arc;

use crate::api::models::{ChatId, PostId, User, UserId, UserSummary};
use crate::api::{ApiError, Backend, FollowApi};
use crate::mutation::{FollowChange, FollowController, MutationError};
use crate::notice::Notifier;
use crate::ui::mvi::ViewStore;
use crate::ui::profile::intent::ProfileIntent;
use crate::ui::profile::reducer::ProfileReducer;
use crate::ui::profile::state::{ProfilePhase, ProfileState};
use crate::ui::ViewError;

const LOAD_FAILED: &str = "Failed to load profile. Please try again.";
const MUST_FOLLOW: &str = "You must follow this user to message them!";
const CHAT_FAILED: &str = "Unable to start chat. Please follow this user first!";
const DELETE_FAILED: &str = "Failed to delete post. Please try again.";
const LIST_FAILED: &str = "Failed to load list. Please try again.";

/// A user's profile page as seen by the session user.
pub struct ProfileController<B> {
    api: Arc<B>,
    viewer: User,
    store: ViewStore<ProfileReducer>,
    follow: Option<FollowController>,
    notifier: Notifier,
}

impl<B: Backend + 'static> ProfileController<B> {
    /// Load the profile of `username`. Load failures end up in the state,
    /// not in the return value.
    pub async fn load(api: Arc<B>, viewer: User, username: &str, notifier: Notifier) -> Self {
        let store = ViewStore::default();
        store.dispatch(ProfileIntent::Loading);

        let mut controller = Self {
            api,
            viewer,
            store,
            follow: None,
            notifier,
        };
        controller.follow = controller.fetch(username).await;
        controller
    }

    async fn fetch(&self, username: &str) -> Option<FollowController> {
        let user = match self.api.find_user(username).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => {
                self.store.dispatch(ProfileIntent::NotFound);
                return None;
            }
            Err(err) => {
                tracing::warn!(username = %username, error = %err, "Profile load failed");
                self.store.dispatch(ProfileIntent::LoadFailed(LOAD_FAILED.into()));
                return None;
            }
        };

        let posts = match self.api.user_posts(user.user_id).await {
            Ok(posts) => posts,
            Err(err) => {
                tracing::warn!(user_id = user.user_id, error = %err, "Profile posts failed");
                self.store.dispatch(ProfileIntent::LoadFailed(LOAD_FAILED.into()));
                return None;
            }
        };

        let is_own = user.user_id == self.viewer.user_id;
        let (following, can_chat) = if is_own {
            (false, false)
        } else {
            self.relationship(&user).await
        };
        let counts = self.api.counts(user.user_id).await.unwrap_or_else(|err| {
            tracing::debug!(user_id = user.user_id, error = %err, "Follow counts unavailable");
            Default::default()
        });

        let follow = if is_own {
            None
        } else {
            let store = self.store.clone();
            let follow_api: Arc<dyn FollowApi> = self.api.clone();
            FollowController::new(follow_api, self.viewer.user_id, user.user_id, following)
                .ok()
                .map(|c| {
                    c.with_listener(Arc::new(move |change: FollowChange| {
                        store.dispatch(ProfileIntent::FollowChanged {
                            following: change.following,
                            follower_count: change.follower_count,
                        });
                    }))
                })
        };

        self.store.dispatch(ProfileIntent::Loaded {
            user,
            posts,
            is_own,
            following,
            can_chat,
            counts,
        });
        follow
    }

    /// Follow and mutual-follow flags. Failures degrade to "not following".
    async fn relationship(&self, user: &User) -> (bool, bool) {
        let following = self
            .api
            .is_following(self.viewer.user_id, user.user_id)
            .await;
        let can_chat = self.api.can_chat(self.viewer.user_id, user.user_id).await;
        if let Err(err) = following.as_ref().and(can_chat.as_ref()) {
            tracing::debug!(user_id = user.user_id, error = %err, "Follow data unavailable");
        }
        (following.unwrap_or(false), can_chat.unwrap_or(false))
    }

    pub fn state(&self) -> ProfileState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<ProfileReducer> {
        &self.store
    }

    /// Follow button state, including an optimistic flip still in flight.
    pub fn follow_displayed(&self) -> Option<bool> {
        self.follow.as_ref().map(|f| f.is_following())
    }

    pub async fn toggle_follow(&self) -> Result<FollowChange, ViewError> {
        let follow = self
            .follow
            .as_ref()
            .ok_or_else(|| ViewError::refused("You cannot follow yourself"))?;

        let change = match follow.toggle().await {
            Ok(change) => change,
            Err(MutationError::Busy) => return Err(MutationError::Busy.into()),
            Err(err) => {
                self.notifier.error(err.to_string());
                return Err(err.into());
            }
        };

        // Messaging needs the edge in both directions; ask rather than assume.
        match self.api.can_chat(self.viewer.user_id, change.target).await {
            Ok(can_chat) => self.store.dispatch(ProfileIntent::CanChat(can_chat)),
            Err(err) => {
                tracing::debug!(target_user = change.target, error = %err, "Chat permission refresh failed");
                if !change.following {
                    self.store.dispatch(ProfileIntent::CanChat(false));
                }
            }
        }
        Ok(change)
    }

    /// Resolve the chat with this profile's user.
    pub async fn message(&self) -> Result<ChatId, ViewError> {
        let (target, can_chat) = self.store.read(|s| (s.user.as_ref().map(|u| u.user_id), s.can_chat));
        let Some(target) = target else {
            return Err(ViewError::refused(LOAD_FAILED));
        };
        if !can_chat {
            self.notifier.warning(MUST_FOLLOW);
            return Err(ViewError::refused(MUST_FOLLOW));
        }
        match self.api.chat_with(self.viewer.user_id, target).await {
            Ok(chat) => Ok(chat.id),
            Err(err) => {
                let err = ViewError::request(err, CHAT_FAILED);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Who follows this profile's user.
    pub async fn followers(&self) -> Result<Vec<UserSummary>, ViewError> {
        let id = self.displayed_id()?;
        self.api
            .followers(id)
            .await
            .map_err(|err| ViewError::request(err, LIST_FAILED))
    }

    /// Whom this profile's user follows.
    pub async fn following(&self) -> Result<Vec<UserSummary>, ViewError> {
        let id = self.displayed_id()?;
        self.api
            .following(id)
            .await
            .map_err(|err| ViewError::request(err, LIST_FAILED))
    }

    fn displayed_id(&self) -> Result<UserId, ViewError> {
        self.store
            .read(|s| s.user.as_ref().map(|u| u.user_id))
            .ok_or_else(|| ViewError::refused(LOAD_FAILED))
    }

    /// Owners delete their own posts; admins delete anyone's.
    pub async fn delete_post(&self, post_id: PostId) -> Result<(), ViewError> {
        let (is_own, ready) = self
            .store
            .read(|s| (s.is_own, s.phase == ProfilePhase::Ready));
        if !ready || !(is_own || self.viewer.admin) {
            return Err(ViewError::refused("You can only delete your own posts"));
        }
        self.api
            .delete_post(post_id)
            .await
            .map_err(|err: ApiError| {
                let err = ViewError::request(err, DELETE_FAILED);
                self.notifier.error(err.to_string());
                err
            })?;
        self.store.dispatch(ProfileIntent::PostRemoved(post_id));
        self.notifier.success("Post deleted");
        Ok(())
    }
}
