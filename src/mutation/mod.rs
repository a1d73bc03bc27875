//! Optimistic mutations.
//!
//! The displayed state changes before the server confirms; a failure
//! reverts it. Each target owns a [`MutationGuard`] so at most one request
//! is in flight per controller.

mod follow;
mod guard;

use thiserror::Error;

use crate::api::ApiError;

pub use follow::{FollowChange, FollowController, FollowListener};
pub use guard::{GuardState, MutationGuard, MutationPermit};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Another mutation on this target is still outstanding.
    #[error("An update is already in progress")]
    Busy,

    /// The server answered but reported non-success.
    #[error("{message}")]
    Rejected { message: String },

    /// The request failed outright.
    #[error("{message}")]
    Failed { message: String, source: ApiError },

    #[error("You cannot follow yourself")]
    SelfFollow,
}
