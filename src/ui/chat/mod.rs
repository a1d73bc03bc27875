//! Chat window: message list, composer and the send state machine.

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::{ChatController, ChatError};
pub use intent::ChatIntent;
pub use reducer::ChatReducer;
pub use state::{compose, ChatPhase, ChatViewState, ComposeError, Peer};
