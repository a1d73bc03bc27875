//! Login, registration and profile edit forms.

use std::sync::Arc;

use thiserror::Error;

use crate::api::models::{NewUser, User};
use crate::api::{ApiError, UserApi};
use crate::session::{SessionContext, SessionError};
use crate::storage::{Folder, ObjectStore, StorageError, Upload};
use crate::validation::{
    validate_login, validate_profile, validate_profile_picture, validate_registration, Field,
    FieldErrors,
};

const BAD_CREDENTIALS: &str = "Invalid username or password. Please try again.";
const LOGIN_FAILED: &str = "An unexpected error occurred. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please check all fields and try again.";
const UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
const PICTURE_FAILED: &str = "Failed to upload profile picture. Please try again.";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Local validation failed; nothing was sent.
    #[error("Please fix the errors above")]
    Invalid(FieldErrors),

    #[error("{message}")]
    Rejected { message: String, source: ApiError },

    #[error("{message}")]
    Storage {
        message: String,
        source: StorageError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AuthError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

pub struct AuthController<B> {
    api: Arc<B>,
    storage: Arc<dyn ObjectStore>,
    session: SessionContext,
}

impl<B: UserApi + 'static> AuthController<B> {
    pub fn new(api: Arc<B>, storage: Arc<dyn ObjectStore>, session: SessionContext) -> Self {
        Self {
            api,
            storage,
            session,
        }
    }

    /// Check credentials and start the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let errors = validate_login(username, password);
        if !errors.is_empty() {
            return Err(AuthError::Invalid(errors));
        }

        let user = self.api.login(username, password).await.map_err(|source| {
            let message = if source.status() == Some(401) {
                BAD_CREDENTIALS.to_string()
            } else {
                source.user_message(LOGIN_FAILED)
            };
            tracing::warn!(username = %username, error = %source, "Login failed");
            AuthError::Rejected { message, source }
        })?;

        self.session.begin(user.clone())?;
        Ok(user)
    }

    /// Create an account. A profile picture is uploaded first; if that
    /// upload fails the account is created without one. If the account
    /// write fails the uploaded picture is deleted again.
    pub async fn register(&self, user: NewUser, picture: Option<Upload>) -> Result<(), AuthError> {
        let mut errors = validate_registration(&user);
        if let Some(Err(message)) = picture.as_ref().map(validate_profile_picture) {
            errors.insert(Field::ProfilePicture, message);
        }
        if !errors.is_empty() {
            return Err(AuthError::Invalid(errors));
        }

        let picture_url = match &picture {
            Some(upload) => match self.storage.upload(Folder::ProfilePictures, upload).await {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(error = %err, "Profile picture upload failed, registering without it");
                    None
                }
            },
            None => None,
        };

        let new_user = NewUser {
            profile_picture: picture_url.clone(),
            ..user
        };
        if let Err(source) = self.api.register(&new_user).await {
            if let Some(url) = picture_url {
                if let Err(err) = self.storage.delete(&url).await {
                    tracing::warn!(url = %url, error = %err, "Orphaned profile picture left in storage");
                }
            }
            let message = match &source {
                ApiError::Client {
                    status: 400,
                    message: Some(message),
                } => message.clone(),
                other => other.user_message(REGISTER_FAILED),
            };
            return Err(AuthError::Rejected { message, source });
        }

        tracing::info!(username = %new_user.username, "Registered");
        Ok(())
    }

    /// Save edits to the session user's own profile. A new picture is
    /// uploaded first and removed again if the save fails. The session
    /// record is refreshed on success.
    pub async fn update_profile(&self, edited: User, picture: Option<Upload>) -> Result<User, AuthError> {
        let current = self.session.require()?;
        let mut errors = validate_profile(&edited);
        if let Some(Err(message)) = picture.as_ref().map(validate_profile_picture) {
            errors.insert(Field::ProfilePicture, message);
        }
        if !errors.is_empty() {
            return Err(AuthError::Invalid(errors));
        }

        // Identity and role are not editable here.
        let mut user = User {
            user_id: current.user_id,
            username: current.username.clone(),
            admin: current.admin,
            ..edited
        };

        let uploaded = match &picture {
            Some(upload) => {
                let url = self
                    .storage
                    .upload(Folder::ProfilePictures, upload)
                    .await
                    .map_err(|source| AuthError::Storage {
                        message: PICTURE_FAILED.to_string(),
                        source,
                    })?;
                user.profile_picture = Some(url.clone());
                Some(url)
            }
            None => None,
        };

        if let Err(source) = self.api.update_user(&user).await {
            if let Some(url) = uploaded {
                if let Err(err) = self.storage.delete(&url).await {
                    tracing::warn!(url = %url, error = %err, "Orphaned profile picture left in storage");
                }
            }
            return Err(AuthError::Rejected {
                message: source.user_message(UPDATE_FAILED),
                source,
            });
        }

        self.session.refresh(user.clone())?;
        tracing::info!(user_id = user.user_id, "Profile updated");
        Ok(user)
    }
}
