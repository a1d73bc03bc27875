//! Profile page: the user's posts, follow counts, follow button and the
//! message action.

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::ProfileController;
pub use intent::ProfileIntent;
pub use reducer::ProfileReducer;
pub use state::{ProfilePhase, ProfileState};
