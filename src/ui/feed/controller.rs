use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::api::models::{Media, PostDraft, PostId, User};
use crate::api::{ApiError, Backend};
use crate::notice::Notifier;
use crate::storage::{Folder, ObjectStore, StorageError, Upload};
use crate::sync::Sequencer;
use crate::ui::feed::intent::FeedIntent;
use crate::ui::feed::reducer::FeedReducer;
use crate::ui::feed::state::FeedState;
use crate::ui::mvi::ViewStore;
use crate::ui::ViewError;

const CREATE_FAILED: &str = "Failed to create post. Please try again.";
const UPDATE_FAILED: &str = "Failed to update post. Please try again.";
const DELETE_FAILED: &str = "Failed to delete post. Please try again.";

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Write something or attach a photo or video")]
    Empty,

    #[error("A post is already being submitted")]
    Busy,

    #[error("Failed to upload {kind}. Please try again.")]
    Upload {
        kind: &'static str,
        source: StorageError,
    },

    /// The record write failed. Any media uploaded for it has been removed
    /// unless `orphaned` names the URL left behind.
    #[error("{message}")]
    Create {
        message: String,
        source: ApiError,
        orphaned: Option<String>,
    },
}

/// The post feed: listing, composing, editing and deleting posts.
pub struct FeedController<B> {
    api: Arc<B>,
    storage: Arc<dyn ObjectStore>,
    viewer: User,
    store: ViewStore<FeedReducer>,
    loads: Sequencer,
    notifier: Notifier,
}

impl<B: Backend + 'static> FeedController<B> {
    pub fn new(api: Arc<B>, storage: Arc<dyn ObjectStore>, viewer: User, notifier: Notifier) -> Self {
        Self {
            api,
            storage,
            viewer,
            store: ViewStore::default(),
            loads: Sequencer::new(),
            notifier,
        }
    }

    pub fn state(&self) -> FeedState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<FeedReducer> {
        &self.store
    }

    /// Fetch the feed and the viewer's following set. A failed feed shows
    /// as empty; a failed following list just leaves the markers stale.
    pub async fn load(&self) {
        let ticket = self.loads.issue();
        self.store.dispatch(FeedIntent::Loading);

        let feed = self.api.feed().await;
        let following = self.api.following(self.viewer.user_id).await;

        self.loads.apply_if_fresh(ticket, || {
            match feed {
                Ok(posts) => self.store.dispatch(FeedIntent::Loaded(posts)),
                Err(err) => {
                    tracing::warn!(error = %err, "Feed load failed");
                    self.store.dispatch(FeedIntent::LoadFailed);
                }
            }
            match following {
                Ok(users) => {
                    let ids: HashSet<_> = users.into_iter().map(|u| u.user_id).collect();
                    self.store.dispatch(FeedIntent::FollowingLoaded(ids));
                }
                Err(err) => tracing::debug!(error = %err, "Following list unavailable"),
            }
        });
    }

    /// Upload the attachment (if any), then write the post. When the write
    /// fails the upload is deleted again so no orphan is left in storage.
    pub async fn create_post(&self, content: &str, media: Option<Upload>) -> Result<(), PostError> {
        if content.trim().is_empty() && media.is_none() {
            return Err(PostError::Empty);
        }
        self.store.try_dispatch(|state| {
            if state.submitting {
                Err(PostError::Busy)
            } else {
                Ok(FeedIntent::Submitting)
            }
        })?;

        let result = self.publish(content, media).await;
        self.store.dispatch(FeedIntent::Submitted);

        match &result {
            Ok(()) => {
                self.notifier.success("Post created");
                self.load().await;
            }
            Err(err) => self.notifier.error(err.to_string()),
        }
        result
    }

    async fn publish(&self, content: &str, media: Option<Upload>) -> Result<(), PostError> {
        let attached = match media {
            Some(upload) => {
                let (folder, kind) = if upload.is_video() {
                    (Folder::PostVideos, "video")
                } else {
                    (Folder::PostImages, "image")
                };
                let url = self
                    .storage
                    .upload(folder, &upload)
                    .await
                    .map_err(|source| PostError::Upload { kind, source })?;
                Some(if upload.is_video() {
                    Media::Video(url)
                } else {
                    Media::Image(url)
                })
            }
            None => None,
        };

        let draft = PostDraft::new(self.viewer.clone(), content).with_media(attached.clone());
        let Err(source) = self.api.create_post(&draft).await else {
            tracing::info!(user_id = self.viewer.user_id, "Post created");
            return Ok(());
        };

        tracing::warn!(error = %source, "Post create failed");
        let orphaned = match attached {
            Some(media) => self.compensate(media.url()).await,
            None => None,
        };
        Err(PostError::Create {
            message: source.user_message(CREATE_FAILED),
            source,
            orphaned,
        })
    }

    /// Remove an upload whose post was never written. Returns the URL if
    /// it could not be removed.
    async fn compensate(&self, url: &str) -> Option<String> {
        match self.storage.delete(url).await {
            Ok(()) => {
                tracing::debug!(url = %url, "Removed orphaned upload");
                None
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "Orphaned upload left in storage");
                Some(url.to_string())
            }
        }
    }

    pub fn edit(&self, post_id: PostId) {
        self.store.dispatch(FeedIntent::Edit(post_id));
    }

    pub fn cancel_edit(&self) {
        self.store.dispatch(FeedIntent::CancelEdit);
    }

    /// Replace the text of the post being edited, keeping its media.
    pub async fn update_post(&self, post_id: PostId, content: &str) -> Result<(), ViewError> {
        let post = self
            .store
            .read(|s| s.posts.iter().find(|p| p.post_id == post_id).cloned())
            .ok_or_else(|| ViewError::refused("Post not found"))?;
        if post.owner_id() != Some(self.viewer.user_id) {
            return Err(ViewError::refused("You can only edit your own posts"));
        }

        let draft = PostDraft::for_update(&post, self.viewer.clone(), content);
        if let Err(err) = self.api.update_post(&draft).await {
            let err = ViewError::request(err, UPDATE_FAILED);
            self.notifier.error(err.to_string());
            return Err(err);
        }
        self.store.dispatch(FeedIntent::CancelEdit);
        self.load().await;
        Ok(())
    }

    pub async fn delete_post(&self, post_id: PostId) -> Result<(), ViewError> {
        let owner = self.store.read(|s| {
            s.posts
                .iter()
                .find(|p| p.post_id == post_id)
                .map(|p| p.owner_id())
        });
        let allowed = self.viewer.admin
            || matches!(owner, Some(Some(id)) if id == self.viewer.user_id);
        if !allowed {
            return Err(ViewError::refused("You can only delete your own posts"));
        }

        if let Err(err) = self.api.delete_post(post_id).await {
            let err = ViewError::request(err, DELETE_FAILED);
            self.notifier.error(err.to_string());
            return Err(err);
        }
        self.store.dispatch(FeedIntent::PostRemoved(post_id));
        self.load().await;
        Ok(())
    }
}
