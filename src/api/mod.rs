//! Remote resource client for the Campus Connect REST backend.
//!
//! Each call is a single round trip returning a typed payload or a
//! classified [`ApiError`]. Nothing here retries or caches.

mod client;
mod error;
pub mod models;
mod resources;
mod traits;

pub use client::{ApiClient, Query};
pub use error::{ApiError, NETWORK_MESSAGE};
pub use traits::{Backend, ChatApi, FollowApi, PostApi, SearchApi, UserApi};
