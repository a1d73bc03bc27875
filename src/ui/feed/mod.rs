//! Post feed with the composer and the edit/delete actions.

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::{FeedController, PostError};
pub use intent::FeedIntent;
pub use reducer::FeedReducer;
pub use state::FeedState;
