//! Views.
//!
//! Each view is a state, an intent and a reducer (see [`mvi`]) plus a
//! controller that performs requests and feeds their outcomes back through
//! the reducer. Controllers take the session user explicitly; none of them
//! reads global state.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod chat_list;
pub mod discover;
pub mod feed;
pub mod mvi;
pub mod navbar;
pub mod profile;

use thiserror::Error;

use crate::api::ApiError;
use crate::mutation::MutationError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Failure of an explicit user action, carrying the text to show.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Refused locally before any request was made.
    #[error("{0}")]
    Refused(String),

    #[error("{message}")]
    Request { message: String, source: ApiError },

    #[error("{message}")]
    Storage {
        message: String,
        source: StorageError,
    },
}

impl ViewError {
    pub fn refused(message: impl Into<String>) -> Self {
        ViewError::Refused(message.into())
    }

    /// Classify `source` with `fallback` for anything unspecific.
    pub fn request(source: ApiError, fallback: &str) -> Self {
        ViewError::Request {
            message: source.user_message(fallback),
            source,
        }
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ViewError::Request { source, .. } => Some(source),
            ViewError::Mutation(MutationError::Failed { source, .. }) => Some(source),
            _ => None,
        }
    }
}
